use alloy_primitives::{Address, Bytes, B256};
use serde::Serialize;
use serde_json::json;

use crate::capability::CapabilityError;
use crate::eth_rpc::*;

#[derive(Debug, Clone, Serialize)]
pub struct CallRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    pub to: Address,
    pub data: Bytes,
}

impl EthRpc {
    /// `eth_call` against the latest block.
    pub async fn call(&self, request: &CallRequest) -> Result<Bytes, CapabilityError> {
        self.request("eth_call", json!([request, "latest"])).await
    }

    /// `eth_sendTransaction`; the provider signs with `request.from`.
    pub async fn send_transaction(&self, request: &CallRequest) -> Result<B256, CapabilityError> {
        self.request("eth_sendTransaction", json!([request])).await
    }
}
