use std::fmt;
use std::time::Duration;

use alloy_primitives::B256;

use crate::eth_rpc::EthRpc;
use crate::models::DiagnosticKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxState {
    Submitted,
    Confirmed,
    Failed,
}

/// How a pending transaction is polled until it resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationPolicy {
    pub poll_interval: Duration,
    /// Consecutive polls the node must not know the transaction before it counts as dropped.
    pub drop_after_misses: u32,
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(4),
            drop_after_misses: 15,
        }
    }
}

/// A broadcast write that has not been resolved yet.
pub struct PendingTransaction {
    hash: B256,
    state: TxState,
    failure: Option<DiagnosticKind>,
    provider: EthRpc,
    policy: ConfirmationPolicy,
}

impl fmt::Debug for PendingTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingTransaction")
            .field("hash", &self.hash)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl PendingTransaction {
    pub(crate) fn new(hash: B256, provider: EthRpc, policy: ConfirmationPolicy) -> Self {
        Self {
            hash,
            state: TxState::Submitted,
            failure: None,
            provider,
            policy,
        }
    }

    pub fn hash(&self) -> B256 {
        self.hash
    }

    pub fn state(&self) -> TxState {
        self.state
    }

    /// Waits until the network reports the transaction mined.
    ///
    /// Provider faults are logged and polling continues.
    pub async fn confirm(&mut self) -> Result<(), TxError> {
        match (self.state, self.failure) {
            (TxState::Submitted, _) => {}
            (TxState::Confirmed, _) => return Ok(()),
            (TxState::Failed, kind) => {
                return Err(TxError::Resolved {
                    hash: self.hash,
                    kind: kind.unwrap_or(DiagnosticKind::TxReverted),
                })
            }
        }

        let mut misses = 0;
        loop {
            let receipt = self.provider.transaction_receipt(self.hash).await;
            match receipt {
                Ok(Some(receipt)) if receipt.succeeded() => {
                    self.state = TxState::Confirmed;
                    return Ok(());
                }
                Ok(Some(_)) => return Err(self.fail(TxError::Reverted(self.hash))),
                Ok(None) => {
                    let known = self.provider.transaction_known(self.hash).await;
                    match known {
                        Ok(true) => misses = 0,
                        Ok(false) => {
                            misses += 1;
                            tracing::debug!(hash = %self.hash, misses, "transaction not known yet");
                            if misses >= self.policy.drop_after_misses {
                                return Err(self.fail(TxError::Dropped(self.hash)));
                            }
                        }
                        Err(e) => {
                            tracing::warn!(hash = %self.hash, "failed to look up transaction: {e}")
                        }
                    }
                }
                Err(e) => tracing::warn!(hash = %self.hash, "failed to poll receipt: {e}"),
            }

            tokio::time::sleep(self.policy.poll_interval).await;
        }
    }

    fn fail(&mut self, error: TxError) -> TxError {
        self.state = TxState::Failed;
        self.failure = Some(error.kind());
        error
    }
}

#[derive(thiserror::Error, Debug)]
pub enum TxError {
    #[error("Transaction `{0}` reverted")]
    Reverted(B256),
    #[error("Transaction `{0}` was dropped before being mined")]
    Dropped(B256),
    #[error("Transaction `{hash}` already failed")]
    Resolved { hash: B256, kind: DiagnosticKind },
}

impl TxError {
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            Self::Reverted(_) => DiagnosticKind::TxReverted,
            Self::Dropped(_) => DiagnosticKind::TxDropped,
            Self::Resolved { kind, .. } => *kind,
        }
    }
}
