use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::models::{Account, DiagnosticKind};

/// Provider error code for a request the user declined (EIP-1193).
pub const USER_REJECTED_CODE: i64 = 4001;

#[async_trait]
pub trait WalletCapability: Send + Sync {
    async fn request(&self, method: &str, params: Value) -> Result<Value, CapabilityError>;

    /// Accounts already authorized for this client. Never prompts.
    async fn list_authorized_accounts(&self) -> Result<Vec<Account>, CapabilityError> {
        let accounts = self.request("eth_accounts", json!([])).await?;
        parse_accounts(accounts)
    }

    /// Asks the user to authorize at least one account. May prompt.
    async fn request_accounts(&self) -> Result<Vec<Account>, CapabilityError> {
        let accounts = self.request("eth_requestAccounts", json!([])).await?;
        parse_accounts(accounts)
    }
}

fn parse_accounts(value: Value) -> Result<Vec<Account>, CapabilityError> {
    serde_json::from_value(value).map_err(CapabilityError::InvalidResponse)
}

/// Source of the live wallet capability.
pub trait WalletHost: Send + Sync {
    /// `None` when no wallet is installed. Absence is an expected condition.
    fn capability(&self) -> Option<Arc<dyn WalletCapability>>;
}

/// Host holding at most one injected capability, replaceable at runtime.
#[derive(Default)]
pub struct InjectedHost {
    injected: RwLock<Option<Arc<dyn WalletCapability>>>,
}

impl InjectedHost {
    pub fn new(capability: Arc<dyn WalletCapability>) -> Self {
        Self {
            injected: RwLock::new(Some(capability)),
        }
    }

    pub fn absent() -> Self {
        Self::default()
    }

    pub fn inject(&self, capability: Option<Arc<dyn WalletCapability>>) {
        match self.injected.write() {
            Ok(mut injected) => *injected = capability,
            Err(poisoned) => *poisoned.into_inner() = capability,
        }
    }
}

impl WalletHost for InjectedHost {
    fn capability(&self) -> Option<Arc<dyn WalletCapability>> {
        match self.injected.read() {
            Ok(injected) => injected.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum CapabilityError {
    #[error("User rejected the request: {0}")]
    UserRejected(String),
    #[error("Provider returned error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("Failed to reach wallet provider: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Unexpected provider response: {0}")]
    InvalidResponse(#[from] serde_json::Error),
}

impl CapabilityError {
    pub fn from_rpc(code: i64, message: String) -> Self {
        if code == USER_REJECTED_CODE {
            Self::UserRejected(message)
        } else {
            Self::Rpc { code, message }
        }
    }

    pub fn is_user_rejection(&self) -> bool {
        matches!(self, Self::UserRejected(_))
    }

    pub fn kind(&self) -> DiagnosticKind {
        match self {
            Self::UserRejected(_) => DiagnosticKind::AuthorizationDenied,
            _ => DiagnosticKind::RemoteReadError,
        }
    }
}
