use crate::capability::CapabilityError;
use crate::eth_rpc::*;
use crate::models::Account;

impl EthRpc {
    pub async fn accounts(&self) -> Result<Vec<Account>, CapabilityError> {
        self.capability.list_authorized_accounts().await
    }

    pub async fn request_accounts(&self) -> Result<Vec<Account>, CapabilityError> {
        self.capability.request_accounts().await
    }

    /// First authorized account, used as the signer for writes.
    pub async fn signer(&self) -> Result<Option<Account>, CapabilityError> {
        Ok(self.accounts().await?.into_iter().next())
    }
}
