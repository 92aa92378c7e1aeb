use alloy_primitives::{B256, U64};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::capability::CapabilityError;
use crate::eth_rpc::*;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: B256,
    #[serde(default)]
    pub block_number: Option<U64>,
    /// `1` on success, `0` when execution reverted.
    #[serde(default)]
    pub status: Option<U64>,
}

impl TransactionReceipt {
    pub fn succeeded(&self) -> bool {
        self.status.map_or(true, |status| status == U64::from(1))
    }
}

impl EthRpc {
    pub async fn transaction_receipt(
        &self,
        hash: B256,
    ) -> Result<Option<TransactionReceipt>, CapabilityError> {
        self.request("eth_getTransactionReceipt", json!([hash])).await
    }

    /// Whether the node still knows about the transaction, mined or pending.
    pub async fn transaction_known(&self, hash: B256) -> Result<bool, CapabilityError> {
        let transaction: Option<Value> =
            self.request("eth_getTransactionByHash", json!([hash])).await?;
        Ok(transaction.is_some())
    }
}
