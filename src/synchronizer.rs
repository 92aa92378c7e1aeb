use std::fmt::Display;
use std::sync::Arc;

use tokio::sync::watch;

use crate::capability::WalletHost;
use crate::contract::{ContractClient, ContractError};
use crate::models::{Account, AppState, Diagnostic, DiagnosticKind, Entry, Step};
use crate::settings::Config;
use crate::wallet::WalletGateway;

pub struct Synchronizer {
    wallet: WalletGateway,
    contract: ContractClient,
    default_message: String,
    state: watch::Sender<AppState>,
}

impl Synchronizer {
    pub fn new(host: Arc<dyn WalletHost>, config: &Config) -> Self {
        let contract = ContractClient::new(
            host.clone(),
            config.contract_address,
            config.confirmation_policy(),
        );

        Self {
            wallet: WalletGateway::new(host),
            contract,
            default_message: config.default_message.clone(),
            state: watch::Sender::new(AppState::default()),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> AppState {
        self.state.borrow().clone()
    }

    /// Picks up an already authorized account and its entries.
    pub async fn load(&self) {
        let Some(account) = self.wallet.discover_authorized_account().await else {
            return;
        };

        self.set_account(account);
        self.fetch_entries(Step::Load).await;
    }

    /// Asks the user to authorize an account, then fetches entries.
    pub async fn connect(&self) {
        match self.wallet.request_authorization().await {
            Ok(account) => {
                self.set_account(account);
                self.fetch_entries(Step::Connect).await;
            }
            Err(e) => self.record(Step::Connect, e.kind(), e),
        }
    }

    pub async fn refresh(&self) {
        self.fetch_entries(Step::Refresh).await;
    }

    pub async fn send(&self) {
        let message = self.default_message.clone();
        self.send_message(&message).await;
    }

    /// Submits a coin, waits for it to be mined and re-reads the entry list.
    ///
    /// Overlapping sends are not serialized; whichever re-read finishes last wins.
    pub async fn send_message(&self, message: &str) {
        self.log_total("Retrieved total coins count before sending").await;

        let mut tx = match self.contract.submit_entry(message).await {
            Ok(tx) => tx,
            Err(ContractError::NoProvider) => {
                tracing::info!("Wallet capability doesn't exist, nothing to send");
                return;
            }
            Err(e) => return self.record(Step::Send, e.kind(), e),
        };

        tracing::info!(hash = %tx.hash(), "Mining...");
        if let Err(e) = tx.confirm().await {
            return self.record(Step::Send, e.kind(), e);
        }
        tracing::info!(hash = %tx.hash(), "Mined");

        self.log_total("Retrieved total coins count after mining").await;
        self.fetch_entries(Step::Send).await;
    }

    async fn fetch_entries(&self, step: Step) {
        match self.contract.list_entries().await {
            Ok(entries) => self.replace_entries(entries),
            Err(ContractError::NoProvider) => {
                tracing::info!("Wallet capability doesn't exist, keeping current entries");
            }
            Err(e) => self.record(step, e.kind(), e),
        }
    }

    async fn log_total(&self, what: &str) {
        match self.contract.total_entries().await {
            Ok(count) => tracing::info!(%count, "{what}"),
            Err(ContractError::NoProvider) => {}
            Err(e) => tracing::warn!("failed to read total coins count: {e}"),
        }
    }

    fn set_account(&self, account: Account) {
        self.state.send_modify(|state| {
            state.current_account = Some(account);
            state.last_diagnostic = None;
        });
    }

    fn replace_entries(&self, entries: Vec<Entry>) {
        tracing::info!(count = entries.len(), "Fetched coins");
        self.state.send_modify(|state| {
            state.all_entries = entries;
            state.last_diagnostic = None;
        });
    }

    fn record(&self, step: Step, kind: DiagnosticKind, error: impl Display) {
        let message = match kind {
            DiagnosticKind::CapabilityAbsent => format!("{error}. Get a wallet!"),
            _ => error.to_string(),
        };
        tracing::error!(?step, ?kind, "{message}");

        self.state.send_modify(|state| {
            state.last_diagnostic = Some(Diagnostic {
                step,
                kind,
                message,
            });
        });
    }
}
