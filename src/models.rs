use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Address of a wallet account as reported by the capability provider.
///
/// Kept opaque: the string is passed back to the provider verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Account(String);

impl Account {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Account {
    fn from(address: &str) -> Self {
        Self::new(address)
    }
}

/// One confirmed coin recorded by the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub sender_address: String,
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

/// Orchestration step a diagnostic was produced by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Load,
    Connect,
    Send,
    Refresh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// No wallet installed; the user should be prompted to install one.
    CapabilityAbsent,
    AuthorizationDenied,
    RemoteReadError,
    SubmissionRejected,
    TxReverted,
    TxDropped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub step: Step,
    pub kind: DiagnosticKind,
    pub message: String,
}

/// Session state observed by the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    pub current_account: Option<Account>,
    pub all_entries: Vec<Entry>,
    pub last_diagnostic: Option<Diagnostic>,
}
