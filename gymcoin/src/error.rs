use alloy_primitives::{B256, U256};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GymError {
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("insufficient funds: need {required} wei, have {available} wei")]
    InsufficientFunds { required: U256, available: U256 },

    #[error("insufficient balance: requested {requested} base units, have {available}")]
    InsufficientBalance { requested: U256, available: U256 },

    #[error("invalid recipient: {0}")]
    InvalidRecipient(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid rate: {0}")]
    InvalidRate(String),

    #[error("invalid profile: {0}")]
    InvalidProfile(String),

    #[error("ledger unavailable: {0}")]
    LedgerUnavailable(String),

    #[error("ledger rejected the operation: {0}")]
    LedgerRejected(String),

    #[error("user rejected the request: {0}")]
    UserRejected(String),

    #[error("transaction {0} reverted")]
    TransactionReverted(B256),

    #[error("unsupported network: expected chain {expected}, connected to {actual}")]
    UnsupportedNetwork { expected: u64, actual: u64 },

    #[error("ABI error: {0}")]
    Abi(#[from] alloy_sol_types::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl GymError {
    /// Whether a caller may reasonably offer the user a retry.
    ///
    /// Pre-flight failures are not recoverable by retrying the same input;
    /// transport failures and wallet rejections are.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            GymError::LedgerUnavailable(_) | GymError::UserRejected(_)
        )
    }
}

impl From<reqwest::Error> for GymError {
    fn from(e: reqwest::Error) -> Self {
        GymError::LedgerUnavailable(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GymError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_errors() {
        assert!(GymError::LedgerUnavailable("timeout".into()).is_recoverable());
        assert!(GymError::UserRejected("denied".into()).is_recoverable());
        assert!(!GymError::InvalidAmount("abc".into()).is_recoverable());
        assert!(!GymError::InsufficientFunds {
            required: U256::from(2u64),
            available: U256::from(1u64),
        }
        .is_recoverable());
    }

    #[test]
    fn test_insufficient_funds_message_mentions_amounts() {
        let err = GymError::InsufficientFunds {
            required: U256::from(100_000_000_000_000u64),
            available: U256::from(90_000_000_000_000u64),
        };
        let msg = err.to_string();
        assert!(msg.contains("100000000000000"), "{msg}");
        assert!(msg.contains("90000000000000"), "{msg}");
    }
}
