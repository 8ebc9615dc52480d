//! Progress reporting kept apart from the retry and sequencing state machines.
//!
//! The executor and sequencer only call into a [`ProgressObserver`]; what
//! happens with those events (terminal output, nothing at all in tests) is up
//! to the implementation handed to them.

use crate::traits::TransactionOutcome;
use std::time::Duration;
use tracing::{error, info, warn};

pub trait ProgressObserver: Send + Sync {
    fn attempt_started(&self, _label: &str, _attempt: u32, _max_attempts: u32) {}

    fn attempt_succeeded(&self, _label: &str, _outcome: &TransactionOutcome, _elapsed: Duration) {}

    /// `retry_in` is `None` once attempts are exhausted.
    fn attempt_failed(
        &self,
        _label: &str,
        _attempt: u32,
        _max_attempts: u32,
        _error: &str,
        _retry_in: Option<Duration>,
    ) {
    }

    fn operation_skipped(&self, _label: &str) {}

    fn sequence_short_circuited(&self, _label: &str) {}

    fn waiting(&self, _remaining: Duration) {}
}

pub struct NoopObserver;

impl ProgressObserver for NoopObserver {}

/// Emits every event through `tracing`, picked up by the terminal and file layers.
pub struct TracingReporter;

impl ProgressObserver for TracingReporter {
    fn attempt_started(&self, label: &str, attempt: u32, max_attempts: u32) {
        if attempt > 1 {
            info!("Executing {} (Attempt {}/{})", label, attempt, max_attempts);
        } else {
            info!("Executing {}", label);
        }
    }

    fn attempt_succeeded(&self, label: &str, outcome: &TransactionOutcome, elapsed: Duration) {
        info!("SUCCESS {} | {:.2}s", label, elapsed.as_secs_f64());
        match &outcome.digest {
            Some(_) => info!("  └─ Transaction: {}", outcome.message),
            None => warn!("  └─ Transaction hash unavailable"),
        }
    }

    fn attempt_failed(
        &self,
        label: &str,
        attempt: u32,
        max_attempts: u32,
        error: &str,
        retry_in: Option<Duration>,
    ) {
        match retry_in {
            Some(delay) => {
                warn!(
                    "{} failed (Attempt {}/{}): {}",
                    label, attempt, max_attempts, error
                );
                info!("Retrying in {:.1} seconds...", delay.as_secs_f64());
            }
            None => {
                error!("FAILED {}", label);
                error!("  └─ Error: {}", error);
            }
        }
    }

    fn operation_skipped(&self, label: &str) {
        info!("Skipping {} (disabled in config)", label);
    }

    fn sequence_short_circuited(&self, label: &str) {
        warn!("{} failed, skipping remaining operations.", label);
    }

    fn waiting(&self, remaining: Duration) {
        info!("Next transaction in {}s", remaining.as_secs());
    }
}
