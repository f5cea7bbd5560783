use alloy_primitives::{B256, U256};
use serde::{Deserialize, Serialize};

/// The parts of `eth_getTransactionReceipt` the client cares about.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxReceipt {
    pub transaction_hash: B256,
    pub block_number: Option<U256>,
    /// `0x1` on success, `0x0` when the transaction reverted.
    pub status: Option<U256>,
    pub gas_used: Option<U256>,
}

impl TxReceipt {
    pub fn succeeded(&self) -> bool {
        self.status.is_some_and(|s| s == U256::from(1u64))
    }
}
