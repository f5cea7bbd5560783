pub mod endpoints;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{GymError, Result};
use crate::types::{RpcErrorObject, RpcRequest, RpcResponse};

/// EIP-1193 "user rejected request".
pub const USER_REJECTED_CODE: i64 = 4001;
/// Geth-style "execution reverted".
pub const EXECUTION_REVERTED_CODE: i64 = 3;

/// HTTP client wrapper for an Ethereum JSON-RPC endpoint.
#[derive(Debug, Clone)]
pub struct RpcClient {
    client: Client,
    url: String,
    next_id: Arc<AtomicU64>,
}

impl RpcClient {
    pub fn new(url: &str) -> Self {
        Self {
            client: Client::new(),
            url: url.trim_end_matches('/').to_string(),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Issue a JSON-RPC call and decode its `result`.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = RpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };
        debug!(id, method, "rpc request");

        let resp = self.client.post(&self.url).json(&body).send().await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let text = resp.text().await.unwrap_or_default();
            return Err(GymError::LedgerUnavailable(format!(
                "HTTP {status} from {method}: {text}"
            )));
        }

        let envelope: RpcResponse<T> = resp.json().await?;
        if let Some(err) = envelope.error {
            return Err(map_rpc_error(method, err));
        }
        // A JSON `null` result lands here too; callers that expect it ask for
        // `Option<T>`.
        match envelope.result {
            Some(result) => Ok(result),
            None => serde_json::from_value(serde_json::Value::Null).map_err(|_| {
                GymError::LedgerUnavailable(format!("{method} returned no result"))
            }),
        }
    }

    /// Get the endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Classify a JSON-RPC error object into the client's error taxonomy.
pub fn map_rpc_error(method: &str, err: RpcErrorObject) -> GymError {
    let message = format!("{method}: {} (code {})", err.message, err.code);
    if err.code == USER_REJECTED_CODE {
        GymError::UserRejected(message)
    } else if err.code == EXECUTION_REVERTED_CODE || err.message.contains("revert") {
        GymError::LedgerRejected(message)
    } else {
        GymError::LedgerUnavailable(message)
    }
}
