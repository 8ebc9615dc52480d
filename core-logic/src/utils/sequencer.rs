use crate::reporter::ProgressObserver;
use crate::traits::{Task, WalletStats};
use crate::utils::delay;
use crate::utils::retry::TransactionExecutor;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OperationCategory {
    Wrap,
    Swap,
    Liquidity,
}

/// Declarative description of one step in a wallet's sequence.
pub struct OperationSpec<Ctx> {
    /// Unique key
    pub name: String,
    pub label: String,
    pub category: OperationCategory,
    pub enabled: bool,
    /// Failure after retries aborts the rest of the sequence
    pub critical: bool,
    pub task: Arc<dyn Task<Ctx>>,
}

impl<Ctx> Clone for OperationSpec<Ctx> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            label: self.label.clone(),
            category: self.category,
            enabled: self.enabled,
            critical: self.critical,
            task: Arc::clone(&self.task),
        }
    }
}

impl<Ctx> fmt::Debug for OperationSpec<Ctx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationSpec")
            .field("name", &self.name)
            .field("label", &self.label)
            .field("category", &self.category)
            .field("enabled", &self.enabled)
            .field("critical", &self.critical)
            .finish()
    }
}

/// Enabled operations per category.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OperationSummary {
    pub wrap_enabled: bool,
    pub swaps: usize,
    pub liquidity: usize,
}

impl OperationSummary {
    pub fn from_specs<Ctx>(specs: &[OperationSpec<Ctx>]) -> Self {
        let enabled = |category| {
            specs
                .iter()
                .filter(|s| s.enabled && s.category == category)
                .count()
        };
        Self {
            wrap_enabled: enabled(OperationCategory::Wrap) > 0,
            swaps: enabled(OperationCategory::Swap),
            liquidity: enabled(OperationCategory::Liquidity),
        }
    }
}

impl fmt::Display for OperationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} Wrapping, {} swaps, {} liquidity provisions",
            if self.wrap_enabled { "✅" } else { "❌" },
            self.swaps,
            self.liquidity
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceState {
    Pending,
    Running,
    ShortCircuited,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequenceSettings {
    pub delay_between_ops_ms: u64,
    pub use_jitter: bool,
    /// 0 disables the remaining-time tick
    pub countdown_tick_ms: u64,
}

impl Default for SequenceSettings {
    fn default() -> Self {
        Self {
            delay_between_ops_ms: 0,
            use_jitter: false,
            countdown_tick_ms: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequenceReport {
    pub stats: WalletStats,
    pub state: SequenceState,
}

/// Runs one wallet's operations in order, one at a time.
pub struct OperationSequencer<'a> {
    executor: &'a TransactionExecutor,
    settings: SequenceSettings,
}

impl<'a> OperationSequencer<'a> {
    pub fn new(executor: &'a TransactionExecutor, settings: SequenceSettings) -> Self {
        Self { executor, settings }
    }

    pub async fn run_sequence<Ctx>(
        &self,
        ctx: &Ctx,
        wallet_address: &str,
        specs: &[OperationSpec<Ctx>],
    ) -> SequenceReport
    where
        Ctx: Send + Sync,
    {
        let observer = self.executor.observer();
        let mut stats = WalletStats::default();
        let mut state = SequenceState::Pending;

        for (i, spec) in specs.iter().enumerate() {
            state = SequenceState::Running;
            stats.total += 1;

            if !spec.enabled {
                stats.skipped += 1;
                observer.operation_skipped(&spec.label);
                continue;
            }

            let task = Arc::clone(&spec.task);
            let result = self
                .executor
                .execute(&spec.label, wallet_address, spec.critical, || task.run(ctx))
                .await;

            match result {
                Ok(true) => {
                    stats.successful += 1;
                    let is_last = i + 1 == specs.len();
                    if !is_last && self.settings.delay_between_ops_ms > 0 {
                        self.wait_between_ops(observer.as_ref()).await;
                    }
                }
                Ok(false) => stats.failed += 1,
                // Only critical operations come back as errors
                Err(e) => {
                    debug!("{}", e);
                    stats.failed += 1;
                    observer.sequence_short_circuited(&spec.label);
                    state = SequenceState::ShortCircuited;
                    break;
                }
            }
        }

        if state != SequenceState::ShortCircuited {
            state = SequenceState::Completed;
        }

        SequenceReport { stats, state }
    }

    async fn wait_between_ops(&self, observer: &dyn ProgressObserver) {
        let wait = delay::jittered_delay(
            self.settings.delay_between_ops_ms,
            self.settings.use_jitter,
        );
        let tick = Duration::from_millis(self.settings.countdown_tick_ms);
        delay::countdown(wait, tick, |remaining| observer.waiting(remaining)).await;
    }
}
