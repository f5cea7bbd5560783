//! Wallet factory: builds a [`TokenWallet`] connected to the configured node.
//!
//! Configuration comes from the Sepolia deployment defaults, then `GYM_*`
//! environment variables (a `.env` file is loaded first), then flags.

use std::sync::Arc;

use alloy_primitives::{address, Address, U256};
use gymcoin::address::parse_address;
use gymcoin::{GymClient, GymConfig, TokenWallet};
use tracing::info;

use crate::error::CliError;

/// Sepolia testnet.
pub const SEPOLIA_CHAIN_ID: u64 = 11_155_111;

/// Deployed GymCoin token.
pub const GYM_COIN_ADDRESS: Address = address!("8b76c7e98e857688accb3b65376b0ccf59d3d19d");

/// Deployed UserProfile registry.
pub const USER_PROFILE_ADDRESS: Address = address!("0155aaedc1b352a3c02c930d5eb781a27baad3aa");

/// Return the Sepolia deployment configuration, signing through a local node.
pub fn sepolia_config() -> GymConfig {
    GymConfig::new(
        "http://localhost:8545",
        SEPOLIA_CHAIN_ID,
        GYM_COIN_ADDRESS,
        USER_PROFILE_ADDRESS,
    )
}

fn env_address(var: &'static str, value: &str) -> Result<Address, CliError> {
    parse_address(value).map_err(|e| CliError::Env {
        var,
        reason: e.to_string(),
    })
}

/// Apply `GYM_*` overrides from `lookup` and the `--rpc-url` flag.
pub fn configure(
    mut config: GymConfig,
    rpc_url: Option<String>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<GymConfig, CliError> {
    if let Some(url) = lookup("GYM_RPC_URL") {
        config.rpc_url = url;
    }
    if let Some(value) = lookup("GYM_TOKEN_ADDRESS") {
        config.token_address = env_address("GYM_TOKEN_ADDRESS", &value)?;
    }
    if let Some(value) = lookup("GYM_PROFILE_ADDRESS") {
        config.profile_address = env_address("GYM_PROFILE_ADDRESS", &value)?;
    }
    if let Some(value) = lookup("GYM_SENDER") {
        config.sender = Some(env_address("GYM_SENDER", &value)?);
    }
    if let Some(value) = lookup("GYM_RATE_DIVISOR") {
        let divisor = value.trim().parse::<U256>().map_err(|e| CliError::Env {
            var: "GYM_RATE_DIVISOR",
            reason: e.to_string(),
        })?;
        config.rate_divisor = Some(divisor);
    }
    if let Some(url) = rpc_url {
        config.rpc_url = url;
    }
    Ok(config)
}

/// Connect to the configured node and wrap the client in a [`TokenWallet`].
///
/// # Errors
///
/// Returns [`CliError::Env`] for a malformed `GYM_*` variable and
/// [`CliError::Gym`] if the node is unreachable or on the wrong chain.
pub async fn create_wallet(rpc_url: Option<String>) -> Result<TokenWallet, CliError> {
    let _ = dotenvy::dotenv(); // load .env if present

    let config = configure(sepolia_config(), rpc_url, |var| std::env::var(var).ok())?;
    info!(rpc_url = %config.rpc_url, chain_id = config.chain_id, "connecting");

    let client = GymClient::connect(config).await?;
    Ok(TokenWallet::new(Arc::new(client)))
}
