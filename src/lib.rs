use std::sync::Arc;

use anyhow::{Context, Result};

use crate::capability::{InjectedHost, WalletCapability};
use crate::http_wallet::HttpWallet;
use crate::models::AppState;
use crate::settings::Config;
use crate::synchronizer::Synchronizer;

pub mod capability;
pub mod contract;
pub mod eth_rpc;
pub mod http_wallet;
pub mod models;
pub mod settings;
pub mod synchronizer;
pub mod transaction;
pub mod wallet;

/// User action driven by the headless front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    List,
    Connect,
    Send { message: Option<String> },
}

pub fn wallet_host(config: &Config) -> Result<InjectedHost> {
    let Some(endpoint) = config.rpc_endpoint.as_deref() else {
        return Ok(InjectedHost::absent());
    };

    let wallet = HttpWallet::new(endpoint, config.rpc_timeout())
        .with_context(|| format!("Failed to create wallet for `{endpoint}`"))?;
    let wallet: Arc<dyn WalletCapability> = Arc::new(wallet);

    Ok(InjectedHost::new(wallet))
}

pub async fn start_service(config: Config, action: Action) -> Result<AppState> {
    let host = Arc::new(wallet_host(&config)?);
    let synchronizer = Synchronizer::new(host, &config);

    synchronizer.load().await;

    match action {
        Action::List => {}
        Action::Connect => synchronizer.connect().await,
        Action::Send { message: None } => synchronizer.send().await,
        Action::Send {
            message: Some(message),
        } => synchronizer.send_message(&message).await,
    }

    Ok(synchronizer.snapshot())
}
