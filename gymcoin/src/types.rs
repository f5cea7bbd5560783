mod profile;
mod receipt;
mod rpc;
mod snapshot;

pub use profile::UserProfile;
pub use receipt::TxReceipt;
pub use rpc::{CallRequest, RpcErrorObject, RpcRequest, RpcResponse, TransactionRequest};
pub use snapshot::BalanceSnapshot;
