use alloy_primitives::{Address, Bytes, B256, U256};
use serde_json::json;

use crate::error::{GymError, Result};
use crate::rpc::RpcClient;
use crate::types::{CallRequest, TransactionRequest, TxReceipt};

impl RpcClient {
    /// eth_chainId - Chain the endpoint is connected to.
    pub async fn chain_id(&self) -> Result<u64> {
        let hex: String = self.request("eth_chainId", json!([])).await?;
        parse_quantity(&hex)
    }

    /// eth_accounts - Accounts the node or wallet can sign for.
    pub async fn accounts(&self) -> Result<Vec<Address>> {
        self.request("eth_accounts", json!([])).await
    }

    /// eth_getBalance - ETH balance in wei at the latest block.
    pub async fn get_balance(&self, address: Address) -> Result<U256> {
        self.request("eth_getBalance", json!([address, "latest"]))
            .await
    }

    /// eth_call - Execute a read-only contract call at the latest block.
    pub async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        self.request("eth_call", json!([CallRequest { to, data }, "latest"]))
            .await
    }

    /// eth_sendTransaction - Hand a transaction to the node or wallet for signing.
    pub async fn send_transaction(&self, tx: TransactionRequest) -> Result<B256> {
        self.request("eth_sendTransaction", json!([tx])).await
    }

    /// eth_getTransactionReceipt - `None` while the transaction is pending.
    pub async fn get_transaction_receipt(&self, hash: B256) -> Result<Option<TxReceipt>> {
        self.request("eth_getTransactionReceipt", json!([hash]))
            .await
    }
}

/// Parse a `0x`-prefixed hex quantity into a `u64`.
pub fn parse_quantity(value: &str) -> Result<u64> {
    let digits = value.strip_prefix("0x").unwrap_or(value);
    u64::from_str_radix(digits, 16)
        .map_err(|e| GymError::LedgerUnavailable(format!("bad quantity {value:?}: {e}")))
}
