use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::capability::{CapabilityError, WalletCapability};

/// Wallet capability backed by a JSON-RPC node that holds unlocked accounts.
pub struct HttpWallet {
    endpoint: Url,
    client: reqwest::Client,
    next_id: AtomicU64,
}

impl HttpWallet {
    pub fn new(endpoint: &str, timeout: Duration) -> anyhow::Result<Self> {
        let endpoint = Url::parse(endpoint)?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            endpoint,
            client,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl WalletCapability for HttpWallet {
    async fn request(&self, method: &str, params: Value) -> Result<Value, CapabilityError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(id, method, "sending wallet request");

        let response: RpcResponse = self
            .client
            .post(self.endpoint.clone())
            .json(&RpcRequest {
                jsonrpc: "2.0",
                id,
                method,
                params,
            })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response.into_result()
    }
}

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

impl RpcResponse {
    fn into_result(self) -> Result<Value, CapabilityError> {
        match (self.error, self.result) {
            (Some(e), _) => Err(CapabilityError::from_rpc(e.code, e.message)),
            // `null` results are meaningful (e.g. a receipt that is not there yet)
            (None, result) => Ok(result.unwrap_or(Value::Null)),
        }
    }
}
