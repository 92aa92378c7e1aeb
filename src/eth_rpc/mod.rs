use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::capability::{CapabilityError, WalletCapability};

mod accounts;
mod calls;
mod transactions;

pub use calls::CallRequest;
pub use transactions::TransactionReceipt;

/// Typed Ethereum RPC on top of one resolved wallet capability.
#[derive(Clone)]
pub struct EthRpc {
    capability: Arc<dyn WalletCapability>,
}

impl EthRpc {
    pub fn new(capability: Arc<dyn WalletCapability>) -> Self {
        Self { capability }
    }

    pub fn capability(&self) -> &Arc<dyn WalletCapability> {
        &self.capability
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, CapabilityError> {
        let value = self.capability.request(method, params).await?;
        serde_json::from_value(value).map_err(CapabilityError::InvalidResponse)
    }
}
