use std::sync::Arc;

use alloy_primitives::{Address, U256};
use alloy_sol_types::{sol, SolCall};
use chrono::{DateTime, Utc};

use crate::capability::{CapabilityError, WalletHost};
use crate::eth_rpc::{CallRequest, EthRpc};
use crate::models::{DiagnosticKind, Entry};
use crate::transaction::{ConfirmationPolicy, PendingTransaction};

sol! {
    interface CoinPortal {
        #[derive(Debug, PartialEq)]
        struct Coin {
            address sender;
            string message;
            uint256 timestamp;
        }

        function getAllCoins() external view returns (Coin[] memory);
        function getTotalCoins() external view returns (uint256);
        function sendCoin(string memory _message) external;
    }
}

/// Provider and signer are resolved from the wallet host on every call.
#[derive(Clone)]
pub struct ContractClient {
    host: Arc<dyn WalletHost>,
    address: Address,
    confirmation: ConfirmationPolicy,
}

impl ContractClient {
    pub fn new(
        host: Arc<dyn WalletHost>,
        address: Address,
        confirmation: ConfirmationPolicy,
    ) -> Self {
        Self {
            host,
            address,
            confirmation,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    fn provider(&self) -> Result<EthRpc, ContractError> {
        self.host
            .capability()
            .map(EthRpc::new)
            .ok_or(ContractError::NoProvider)
    }

    async fn read<C: SolCall>(&self, call: C) -> Result<C::Return, ContractError> {
        let provider = self.provider()?;
        let request = CallRequest {
            from: None,
            to: self.address,
            data: call.abi_encode().into(),
        };

        let output = provider
            .call(&request)
            .await
            .map_err(ContractError::RemoteRead)?;

        C::abi_decode_returns(&output).map_err(ContractError::Decode)
    }

    /// All recorded coins, in the order the contract reports them.
    pub async fn list_entries(&self) -> Result<Vec<Entry>, ContractError> {
        let coins = self.read(CoinPortal::getAllCoinsCall {}).await?;
        coins.into_iter().map(entry_from_coin).collect()
    }

    pub async fn total_entries(&self) -> Result<U256, ContractError> {
        self.read(CoinPortal::getTotalCoinsCall {}).await
    }

    /// Broadcasts `sendCoin(message)` signed by the first authorized account.
    pub async fn submit_entry(&self, message: &str) -> Result<PendingTransaction, ContractError> {
        let provider = self.provider()?;
        let signer = provider
            .signer()
            .await
            .map_err(ContractError::SubmissionRejected)?
            .ok_or(ContractError::NoSigner)?;

        let call = CoinPortal::sendCoinCall {
            _message: message.to_string(),
        };
        let request = CallRequest {
            from: Some(signer.as_str().to_string()),
            to: self.address,
            data: call.abi_encode().into(),
        };

        let hash = provider
            .send_transaction(&request)
            .await
            .map_err(ContractError::SubmissionRejected)?;

        Ok(PendingTransaction::new(hash, provider, self.confirmation))
    }
}

fn entry_from_coin(coin: CoinPortal::Coin) -> Result<Entry, ContractError> {
    Ok(Entry {
        sender_address: coin.sender.to_checksum(None),
        timestamp: instant_from_unix_seconds(coin.timestamp)?,
        message: coin.message,
    })
}

/// Converts a contract timestamp (unix seconds) to an instant with millisecond precision.
pub fn instant_from_unix_seconds(seconds: U256) -> Result<DateTime<Utc>, ContractError> {
    i64::try_from(seconds)
        .ok()
        .and_then(|seconds| seconds.checked_mul(1000))
        .and_then(DateTime::from_timestamp_millis)
        .ok_or(ContractError::InvalidTimestamp(seconds))
}

#[derive(thiserror::Error, Debug)]
pub enum ContractError {
    #[error("Wallet capability doesn't exist")]
    NoProvider,
    #[error("No authorized account to sign with")]
    NoSigner,
    #[error("Failed to read contract state: {0}")]
    RemoteRead(#[source] CapabilityError),
    #[error("Failed to decode contract response: {0}")]
    Decode(#[source] alloy_sol_types::Error),
    #[error("Timestamp `{0}` is out of range")]
    InvalidTimestamp(U256),
    #[error("Transaction was rejected: {0}")]
    SubmissionRejected(#[source] CapabilityError),
}

impl ContractError {
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            Self::NoProvider => DiagnosticKind::CapabilityAbsent,
            Self::NoSigner | Self::SubmissionRejected(_) => DiagnosticKind::SubmissionRejected,
            Self::RemoteRead(_) | Self::Decode(_) | Self::InvalidTimestamp(_) => {
                DiagnosticKind::RemoteReadError
            }
        }
    }
}
