use alloy_primitives::{Address, U256};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::units::TokenAmount;

/// Last observed token balance of one address.
///
/// Replaced as a whole on every applied refresh, never edited in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSnapshot {
    pub address: Address,
    /// Balance in base units.
    pub amount: U256,
    /// Monotonic refresh sequence number that produced this snapshot.
    pub observed_at: u64,
    pub observed_at_utc: DateTime<Utc>,
}

impl BalanceSnapshot {
    pub fn token_amount(&self) -> TokenAmount {
        TokenAmount::from_base_units(self.amount)
    }
}
