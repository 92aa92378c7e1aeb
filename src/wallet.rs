use std::sync::Arc;

use crate::capability::{CapabilityError, WalletHost};
use crate::models::{Account, DiagnosticKind};

/// Account discovery and authorization against the live wallet capability.
#[derive(Clone)]
pub struct WalletGateway {
    host: Arc<dyn WalletHost>,
}

impl WalletGateway {
    pub fn new(host: Arc<dyn WalletHost>) -> Self {
        Self { host }
    }

    /// Returns an account the user has already authorized, without prompting.
    ///
    /// Any fault degrades to `None`.
    pub async fn discover_authorized_account(&self) -> Option<Account> {
        let Some(capability) = self.host.capability() else {
            tracing::error!("Make sure you have a wallet installed!");
            return None;
        };

        tracing::info!("We have the wallet capability");
        match capability.list_authorized_accounts().await {
            Ok(accounts) => match accounts.into_iter().next() {
                Some(account) => {
                    tracing::info!(%account, "Found an authorized account");
                    Some(account)
                }
                None => {
                    tracing::error!("No authorized account found");
                    None
                }
            },
            Err(e) => {
                tracing::error!("failed to list authorized accounts: {e}");
                None
            }
        }
    }

    /// Prompts the user to authorize an account and returns the first one.
    pub async fn request_authorization(&self) -> Result<Account, WalletError> {
        let capability = self.host.capability().ok_or(WalletError::Unavailable)?;

        let accounts = capability.request_accounts().await.map_err(|e| {
            if e.is_user_rejection() {
                WalletError::AuthorizationDenied
            } else {
                WalletError::Capability(e)
            }
        })?;

        let account = accounts.into_iter().next().ok_or(WalletError::NoAccounts)?;
        tracing::info!(%account, "Connected");
        Ok(account)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum WalletError {
    #[error("No wallet found, install one to continue")]
    Unavailable,
    #[error("User declined to authorize an account")]
    AuthorizationDenied,
    #[error("Wallet authorized no accounts")]
    NoAccounts,
    #[error(transparent)]
    Capability(CapabilityError),
}

impl WalletError {
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            Self::Unavailable => DiagnosticKind::CapabilityAbsent,
            Self::AuthorizationDenied | Self::NoAccounts => DiagnosticKind::AuthorizationDenied,
            Self::Capability(e) => e.kind(),
        }
    }
}
