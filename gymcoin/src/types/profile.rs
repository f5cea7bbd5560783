use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::error::{GymError, Result};

/// A registered user, as stored by the UserProfile contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub username: String,
    pub email: String,
    pub wallet: Address,
}

impl UserProfile {
    /// Placeholder returned when no profile could be read for `wallet`.
    pub fn unregistered(wallet: Address) -> Self {
        Self {
            username: String::new(),
            email: String::new(),
            wallet,
        }
    }

    pub fn is_registered(&self) -> bool {
        !self.username.is_empty()
    }

    /// Whether the front end should prompt this wallet to register.
    pub fn needs_registration(&self) -> bool {
        !self.is_registered()
    }

    /// Local checks the contract would otherwise revert on.
    pub fn validate_registration(username: &str, email: &str) -> Result<()> {
        if username.trim().is_empty() {
            return Err(GymError::InvalidProfile("username cannot be empty".into()));
        }
        if email.trim().is_empty() {
            return Err(GymError::InvalidProfile("email cannot be empty".into()));
        }
        if !email.contains('@') {
            return Err(GymError::InvalidProfile(format!("{email:?} is not an email address")));
        }
        Ok(())
    }
}
