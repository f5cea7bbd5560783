pub mod address;
pub mod cache;
pub mod client;
pub mod config;
pub mod contracts;
pub mod error;
pub mod guard;
pub mod history;
pub mod ledger;
pub mod poller;
pub mod rpc;
pub mod types;
pub mod units;
pub mod wallet;

#[cfg(test)]
mod testing;

// ---- Top-level re-exports for ergonomic usage ----

// Client + config
pub use client::GymClient;
pub use config::GymConfig;
pub use error::{GymError, Result};
pub use ledger::Ledger;

// JSON-RPC transport
pub use rpc::RpcClient;

// Balances + polling
pub use cache::{BalanceCache, ListenerId};
pub use poller::{PollHandle, PollingScheduler};

// Amounts + rates
pub use units::{ExchangeRate, TokenAmount};

// Flows + history
pub use history::{TransactionKind, TransactionLog, TransactionRecord, TransactionStatus};
pub use wallet::{Quote, TokenWallet, TxOutcome};

// Data types
pub use types::{BalanceSnapshot, TxReceipt, UserProfile};
