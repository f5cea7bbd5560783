//! The seam between the client core and the chain.
//!
//! Everything the converter, cache, guard and poller need from the outside
//! world goes through [`Ledger`]. [`GymClient`](crate::GymClient) implements
//! it over JSON-RPC; tests substitute an in-memory ledger.

use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;

use crate::error::Result;
use crate::types::{TxReceipt, UserProfile};
use crate::units::ExchangeRate;

#[async_trait]
pub trait Ledger: Send + Sync {
    /// Account that signs mutating calls.
    fn sender(&self) -> Address;

    /// Token balance of `address`, in base units.
    async fn read_balance(&self, address: Address) -> Result<U256>;

    /// ETH balance of `address`, in wei.
    async fn read_eth_balance(&self, address: Address) -> Result<U256>;

    async fn read_rates(&self) -> Result<ExchangeRate>;

    async fn read_profile(&self, address: Address) -> Result<UserProfile>;

    async fn submit_buy(&self, base_units: U256, wei_value: U256) -> Result<B256>;

    async fn submit_sell(&self, base_units: U256) -> Result<B256>;

    async fn submit_transfer(&self, recipient: Address, base_units: U256) -> Result<B256>;

    async fn submit_register(&self, username: &str, email: &str) -> Result<B256>;

    async fn submit_update_profile(&self, username: &str, email: &str) -> Result<B256>;

    /// Owner-only on chain; anyone else gets a revert.
    async fn submit_set_rates(&self, sell_rate_units: U256, buy_rate_units: U256) -> Result<B256>;

    /// Wait until `hash` is mined. A reverted transaction is an error.
    async fn wait_for_receipt(&self, hash: B256) -> Result<TxReceipt>;
}
