use crate::error::ExecutionError;
use crate::reporter::ProgressObserver;
use crate::traits::TransactionOutcome;
use crate::utils::recorder::TransactionRecorder;
use anyhow::{anyhow, Result};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryConfig {
    /// Total attempts, the first one included
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_delay_ms: 5000,
            max_delay_ms: 60000,
            backoff_multiplier: 1.0,
        }
    }
}

impl RetryConfig {
    pub fn new(max_attempts: u32, retry_delay_ms: u64) -> Self {
        Self {
            max_attempts,
            retry_delay_ms,
            max_delay_ms: retry_delay_ms * 30,
            ..Default::default()
        }
    }

    pub fn with_max_delay(mut self, max_delay_ms: u64) -> Self {
        self.max_delay_ms = max_delay_ms;
        self
    }

    pub fn with_backoff(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Delay after the failed attempt `attempt` (1-based). Never jittered.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let delay_ms = self.retry_delay_ms as f64 * self.backoff_multiplier.powi(exponent);
        let delay_ms = delay_ms.min(self.max_delay_ms.max(self.retry_delay_ms) as f64);
        Duration::from_millis(delay_ms as u64)
    }
}

/// Wraps one submission with retry, timing, status classification and
/// optional persistence of the raw result.
pub struct TransactionExecutor {
    retry: RetryConfig,
    recorder: Option<TransactionRecorder>,
    observer: Arc<dyn ProgressObserver>,
}

impl TransactionExecutor {
    pub fn new(retry: RetryConfig, observer: Arc<dyn ProgressObserver>) -> Self {
        Self {
            retry,
            recorder: None,
            observer,
        }
    }

    pub fn with_recorder(mut self, recorder: Option<TransactionRecorder>) -> Self {
        self.recorder = recorder;
        self
    }

    pub fn observer(&self) -> &Arc<dyn ProgressObserver> {
        &self.observer
    }

    /// Runs `action` until it succeeds or attempts run out.
    ///
    /// Returns `Ok(true)` on success and `Ok(false)` when a non-critical
    /// operation exhausts its attempts. A `critical` operation that exhausts
    /// its attempts returns [`ExecutionError::CriticalExhausted`].
    pub async fn execute<F, Fut>(
        &self,
        label: &str,
        wallet_address: &str,
        critical: bool,
        mut action: F,
    ) -> Result<bool, ExecutionError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<TransactionOutcome>>,
    {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            self.observer.attempt_started(label, attempt, max_attempts);
            let started = Instant::now();

            let error = match action().await {
                Ok(outcome) if outcome.is_success() => {
                    self.observer
                        .attempt_succeeded(label, &outcome, started.elapsed());
                    self.persist(wallet_address, label, &outcome);
                    return Ok(true);
                }
                Ok(outcome) => anyhow!(
                    "Transaction failed with status: {}",
                    outcome.error.as_deref().unwrap_or("failure")
                ),
                Err(e) => e,
            };
            let reason = format!("{:#}", error);

            if attempt >= max_attempts {
                self.observer
                    .attempt_failed(label, attempt, max_attempts, &reason, None);
                if critical {
                    return Err(ExecutionError::CriticalExhausted {
                        label: label.to_string(),
                        attempts: attempt,
                        reason,
                    });
                }
                return Ok(false);
            }

            let delay = self.retry.delay_after(attempt);
            self.observer
                .attempt_failed(label, attempt, max_attempts, &reason, Some(delay));
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    fn persist(&self, wallet_address: &str, label: &str, outcome: &TransactionOutcome) {
        let (Some(recorder), Some(raw)) = (&self.recorder, &outcome.raw) else {
            return;
        };
        match recorder.record(wallet_address, label, raw) {
            Ok(path) => debug!("Stored transaction at {}", path.display()),
            Err(e) => warn!("Failed to store transaction: {:#}", e),
        }
    }
}
