use alloy_primitives::{Address, U256};

use crate::error::{GymError, Result};

/// Configuration for the GymCoin client.
#[derive(Debug, Clone)]
pub struct GymConfig {
    /// JSON-RPC endpoint of the node or wallet bridge (e.g. `http://localhost:8545`).
    pub rpc_url: String,
    /// Chain the contracts are deployed on; connecting elsewhere is an error.
    pub chain_id: u64,
    /// GymCoin token contract.
    pub token_address: Address,
    /// UserProfile registry contract.
    pub profile_address: Address,
    /// Account that signs transactions; defaults to the endpoint's first account.
    pub sender: Option<Address>,
    /// Fixed rate divisor; when unset the token's `divisor()` view is read.
    pub rate_divisor: Option<U256>,
    /// Interval between receipt polls while waiting for confirmation.
    pub confirmation_poll_ms: u64,
    /// Give up waiting for a receipt after this long.
    pub confirmation_timeout_ms: u64,
}

impl GymConfig {
    pub fn new(rpc_url: impl Into<String>, chain_id: u64, token_address: Address, profile_address: Address) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            chain_id,
            token_address,
            profile_address,
            sender: None,
            rate_divisor: None,
            confirmation_poll_ms: 2_000,
            confirmation_timeout_ms: 120_000,
        }
    }

    /// Check the configuration before any connection is attempted.
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.rpc_url)
            .map_err(|e| GymError::Config(format!("rpc_url {:?}: {e}", self.rpc_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(GymError::Config(format!(
                "rpc_url must be http(s), got {}",
                url.scheme()
            )));
        }
        if self.token_address == Address::ZERO || self.profile_address == Address::ZERO {
            return Err(GymError::Config("contract addresses must be set".into()));
        }
        if self.rate_divisor.is_some_and(|d| d.is_zero()) {
            return Err(GymError::Config("rate_divisor must be positive".into()));
        }
        if self.confirmation_poll_ms == 0 {
            return Err(GymError::Config("confirmation_poll_ms must be positive".into()));
        }
        Ok(())
    }
}
