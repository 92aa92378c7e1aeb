#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::{sol_data, SolInterface, SolType};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};

use coin_portal_lib::capability::{CapabilityError, InjectedHost, WalletCapability, WalletHost};
use coin_portal_lib::contract::CoinPortal::{self, CoinPortalCalls};
use coin_portal_lib::settings::Config;

pub const ALICE: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";
pub const BOB: &str = "0x3C44CdDdB6a900fa2b585dd299e03d12FA4293BC";

/// What happens to the next broadcast transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Mine,
    Revert,
    Drop,
}

#[derive(Default)]
struct Chain {
    authorized: Vec<String>,
    grant_on_request: Vec<String>,
    reject_requests: bool,
    reject_sends: bool,
    fail_reads: bool,
    prompts: usize,
    coins: Vec<CoinPortal::Coin>,
    outcomes: VecDeque<Outcome>,
    receipts: HashMap<B256, bool>,
    nonce: u64,
    methods: Vec<String>,
    list_reads: usize,
    clock: u64,
}

/// In-memory wallet and chain running the coin portal contract.
#[derive(Default)]
pub struct MockWallet {
    chain: Mutex<Chain>,
}

impl MockWallet {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_authorized(self: Arc<Self>, accounts: &[&str]) -> Arc<Self> {
        self.chain.lock().authorized = accounts.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn granting(self: Arc<Self>, accounts: &[&str]) -> Arc<Self> {
        self.chain.lock().grant_on_request = accounts.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn with_coin(self: Arc<Self>, sender: &str, timestamp: u64, message: &str) -> Arc<Self> {
        self.push_coin(sender, timestamp, message);
        self
    }

    /// A coin written by someone else, outside this client.
    pub fn push_coin(&self, sender: &str, timestamp: u64, message: &str) {
        self.chain.lock().coins.push(CoinPortal::Coin {
            sender: sender.parse().expect("valid address"),
            message: message.to_string(),
            timestamp: U256::from(timestamp),
        });
    }

    pub fn reject_requests(&self) {
        self.chain.lock().reject_requests = true;
    }

    pub fn reject_sends(&self) {
        self.chain.lock().reject_sends = true;
    }

    pub fn fail_reads(&self, fail: bool) {
        self.chain.lock().fail_reads = fail;
    }

    pub fn next_outcome(&self, outcome: Outcome) {
        self.chain.lock().outcomes.push_back(outcome);
    }

    pub fn prompts(&self) -> usize {
        self.chain.lock().prompts
    }

    pub fn coin_count(&self) -> usize {
        self.chain.lock().coins.len()
    }

    pub fn list_reads(&self) -> usize {
        self.chain.lock().list_reads
    }

    pub fn methods(&self) -> Vec<String> {
        self.chain.lock().methods.clone()
    }

    fn eth_call(&self, params: &Value) -> Result<Value, CapabilityError> {
        let mut chain = self.chain.lock();
        if chain.fail_reads {
            return Err(CapabilityError::from_rpc(-32603, "node unavailable".into()));
        }

        let data: Bytes = serde_json::from_value(params[0]["data"].clone())?;
        let output = match CoinPortalCalls::abi_decode(&data) {
            Ok(CoinPortalCalls::getAllCoins(_)) => {
                chain.list_reads += 1;
                <(sol_data::Array<CoinPortal::Coin>,)>::abi_encode_params(&(chain.coins.clone(),))
            }
            Ok(CoinPortalCalls::getTotalCoins(_)) => {
                <(sol_data::Uint<256>,)>::abi_encode_params(&(U256::from(chain.coins.len()),))
            }
            Ok(CoinPortalCalls::sendCoin(_)) | Err(_) => {
                return Err(CapabilityError::from_rpc(3, "execution reverted".into()))
            }
        };

        Ok(json!(Bytes::from(output)))
    }

    fn eth_send_transaction(&self, params: &Value) -> Result<Value, CapabilityError> {
        let mut chain = self.chain.lock();
        if chain.reject_sends {
            return Err(CapabilityError::from_rpc(4001, "User denied transaction signature.".into()));
        }

        let from = params[0]["from"].as_str().unwrap_or_default().to_string();
        if !chain.authorized.contains(&from) {
            return Err(CapabilityError::from_rpc(-32000, "unknown account".into()));
        }

        let data: Bytes = serde_json::from_value(params[0]["data"].clone())?;
        let Ok(CoinPortalCalls::sendCoin(call)) = CoinPortalCalls::abi_decode(&data) else {
            return Err(CapabilityError::from_rpc(-32000, "unexpected call".into()));
        };

        chain.nonce += 1;
        let hash = B256::from(U256::from(chain.nonce));
        match chain.outcomes.pop_front().unwrap_or(Outcome::Mine) {
            Outcome::Mine => {
                chain.clock += 1;
                let coin = CoinPortal::Coin {
                    sender: from.parse::<Address>().expect("valid address"),
                    message: call._message,
                    timestamp: U256::from(1_700_000_000 + chain.clock),
                };
                chain.coins.push(coin);
                chain.receipts.insert(hash, true);
            }
            Outcome::Revert => {
                chain.receipts.insert(hash, false);
            }
            Outcome::Drop => {}
        }

        Ok(json!(hash))
    }
}

#[async_trait]
impl WalletCapability for MockWallet {
    async fn request(&self, method: &str, params: Value) -> Result<Value, CapabilityError> {
        // one suspension point per provider round trip
        tokio::task::yield_now().await;
        self.chain.lock().methods.push(method.to_string());

        match method {
            "eth_accounts" => Ok(json!(self.chain.lock().authorized)),
            "eth_requestAccounts" => {
                let mut chain = self.chain.lock();
                chain.prompts += 1;
                if chain.reject_requests {
                    return Err(CapabilityError::from_rpc(4001, "User rejected the request.".into()));
                }
                chain.authorized = chain.grant_on_request.clone();
                Ok(json!(chain.authorized))
            }
            "eth_call" => self.eth_call(&params),
            "eth_sendTransaction" => self.eth_send_transaction(&params),
            "eth_getTransactionReceipt" => {
                let hash: B256 = serde_json::from_value(params[0].clone())?;
                Ok(match self.chain.lock().receipts.get(&hash) {
                    Some(success) => json!({
                        "transactionHash": hash,
                        "blockNumber": "0x1",
                        "status": if *success { "0x1" } else { "0x0" },
                    }),
                    None => Value::Null,
                })
            }
            // dropped transactions are never known to the node
            "eth_getTransactionByHash" => {
                let hash: B256 = serde_json::from_value(params[0].clone())?;
                if self.chain.lock().receipts.contains_key(&hash) {
                    Ok(json!({ "hash": hash }))
                } else {
                    Ok(Value::Null)
                }
            }
            other => Err(CapabilityError::from_rpc(-32601, format!("method {other} not found"))),
        }
    }
}

pub fn test_config() -> Config {
    Config {
        confirmation_poll_interval_ms: 1,
        confirmation_drop_polls: 3,
        ..Config::default()
    }
}

pub fn host(wallet: &Arc<MockWallet>) -> Arc<InjectedHost> {
    let capability: Arc<dyn WalletCapability> = wallet.clone();
    Arc::new(InjectedHost::new(capability))
}

pub fn absent_host() -> Arc<dyn WalletHost> {
    Arc::new(InjectedHost::absent())
}

/// Wraps a wallet whose node lags behind or fails for the first few transaction polls.
pub struct LaggingNode {
    inner: Arc<MockWallet>,
    receipt_misses: AtomicUsize,
    lookup_misses: AtomicUsize,
    receipt_faults: AtomicUsize,
}

impl LaggingNode {
    pub fn new(inner: Arc<MockWallet>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            receipt_misses: AtomicUsize::new(0),
            lookup_misses: AtomicUsize::new(0),
            receipt_faults: AtomicUsize::new(0),
        })
    }

    pub fn missing(self: Arc<Self>, receipts: usize, lookups: usize) -> Arc<Self> {
        self.receipt_misses.store(receipts, Ordering::SeqCst);
        self.lookup_misses.store(lookups, Ordering::SeqCst);
        self
    }

    pub fn failing_receipts(self: Arc<Self>, faults: usize) -> Arc<Self> {
        self.receipt_faults.store(faults, Ordering::SeqCst);
        self
    }

    pub fn host(self: &Arc<Self>) -> Arc<InjectedHost> {
        let capability: Arc<dyn WalletCapability> = self.clone();
        Arc::new(InjectedHost::new(capability))
    }
}

fn take_one(counter: &AtomicUsize) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

#[async_trait]
impl WalletCapability for LaggingNode {
    async fn request(&self, method: &str, params: Value) -> Result<Value, CapabilityError> {
        match method {
            "eth_getTransactionReceipt" if take_one(&self.receipt_faults) => {
                Err(CapabilityError::from_rpc(-32603, "header not found".into()))
            }
            "eth_getTransactionReceipt" if take_one(&self.receipt_misses) => Ok(Value::Null),
            "eth_getTransactionByHash" if take_one(&self.lookup_misses) => Ok(Value::Null),
            _ => self.inner.request(method, params).await,
        }
    }
}
