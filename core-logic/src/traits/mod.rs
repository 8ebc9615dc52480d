use crate::config::ProxyEndpoint;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Per-wallet counters, folded into [`RunStats`] once the sequence ends.
///
/// `total` counts every visited operation, including disabled ones, so
/// `total == successful + failed + skipped` always holds.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WalletStats {
    pub total: u64,
    pub successful: u64,
    pub failed: u64,
    pub skipped: u64,
}

impl WalletStats {
    pub fn is_consistent(&self) -> bool {
        self.total == self.successful + self.failed + self.skipped
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub total: u64,
    pub successful: u64,
    pub failed: u64,
    pub skipped: u64,
    pub wallets_processed: u64,
    pub wallets_skipped: u64,
}

impl RunStats {
    /// Field-wise sum; order of folding does not matter.
    pub fn merge(&mut self, wallet: &WalletStats) {
        self.total += wallet.total;
        self.successful += wallet.successful;
        self.failed += wallet.failed;
        self.skipped += wallet.skipped;
        self.wallets_processed += 1;
    }

    pub fn is_consistent(&self) -> bool {
        self.total == self.successful + self.failed + self.skipped
    }

    /// Wallets that went through the loop, balance-check skips included.
    pub fn wallets_completed(&self) -> u64 {
        self.wallets_processed + self.wallets_skipped
    }

    pub fn success_rate(&self) -> f64 {
        let attempted = self.successful + self.failed;
        if attempted == 0 {
            0.0
        } else {
            (self.successful as f64 / attempted as f64) * 100.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Success,
    Failure,
}

/// Result of a single submission attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionOutcome {
    pub status: OutcomeStatus,
    pub digest: Option<String>,
    pub error: Option<String>,
    /// Human-readable detail (explorer link, amounts)
    pub message: String,
    /// Full node response, persisted verbatim when tracking is on
    pub raw: Option<Value>,
}

impl TransactionOutcome {
    pub fn success(digest: Option<String>, message: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Success,
            digest,
            error: None,
            message: message.into(),
            raw: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            status: OutcomeStatus::Failure,
            digest: None,
            message: error.clone(),
            error: Some(error),
            raw: None,
        }
    }

    pub fn with_raw(mut self, raw: Value) -> Self {
        self.raw = Some(raw);
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }
}

#[async_trait]
pub trait Task<Ctx>: Send + Sync {
    /// Returns the name of the task
    fn name(&self) -> &str;

    /// Builds and submits the transaction. Parameters live on the task itself.
    async fn run(&self, ctx: &Ctx) -> Result<TransactionOutcome>;
}

/// Signing identity with a stable public address.
pub trait WalletCredential: Send + Sync {
    fn address(&self) -> String;
}

/// Binds a wallet and an optional proxy into whatever a chain's tasks need.
#[async_trait]
pub trait ContextProvider<W>: Send + Sync {
    type Context: Send + Sync;

    async fn connect(&self, wallet: &W, proxy: Option<&ProxyEndpoint>) -> Result<Self::Context>;

    /// Returning `false` skips the wallet without running its sequence.
    async fn preflight(&self, _ctx: &Self::Context) -> Result<bool> {
        Ok(true)
    }
}
