use std::path::Path;
use std::time::Duration;

use alloy_primitives::{address, Address};
use anyhow::{Context, Result};
use serde::Deserialize;

use crate::transaction::ConfirmationPolicy;

pub const ENV_PREFIX: &str = "COIN_PORTAL";

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// JSON-RPC endpoint of the wallet node. `None` means no wallet is installed.
    pub rpc_endpoint: Option<String>,
    pub rpc_timeout_sec: u64,
    pub contract_address: Address,
    pub confirmation_poll_interval_ms: u64,
    /// Consecutive polls without the node knowing the transaction before it is reported dropped.
    pub confirmation_drop_polls: u32,
    pub default_message: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_endpoint: None,
            rpc_timeout_sec: 60,
            contract_address: address!("720eBb5027eCbE42bb90d9cBa4138C98cad4BA06"),
            confirmation_poll_interval_ms: 4000,
            confirmation_drop_polls: 15,
            default_message: "Sending you a coin!".to_string(),
        }
    }
}

impl Config {
    /// Defaults, then the optional YAML file, then `COIN_PORTAL_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Failed to parse configuration")
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_timeout_sec)
    }

    pub fn confirmation_poll_interval(&self) -> Duration {
        Duration::from_millis(self.confirmation_poll_interval_ms)
    }

    pub fn confirmation_policy(&self) -> ConfirmationPolicy {
        ConfirmationPolicy {
            poll_interval: self.confirmation_poll_interval(),
            drop_after_misses: self.confirmation_drop_polls.max(1),
        }
    }
}
