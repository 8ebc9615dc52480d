#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use core_logic::{ProgressObserver, Task, TransactionOutcome};
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub enum Step {
    Succeed,
    FailStatus,
    Error,
}

/// Plays back `script` one step per call, repeating the last step forever.
pub struct ScriptedTask {
    name: String,
    script: Vec<Step>,
    pub calls: Arc<AtomicUsize>,
}

impl ScriptedTask {
    pub fn new(name: &str, script: Vec<Step>) -> Self {
        Self {
            name: name.to_string(),
            script,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn always_ok(name: &str) -> Self {
        Self::new(name, vec![Step::Succeed])
    }

    pub fn always_err(name: &str) -> Self {
        Self::new(name, vec![Step::Error])
    }
}

#[async_trait]
impl<Ctx: Send + Sync> Task<Ctx> for ScriptedTask {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, _ctx: &Ctx) -> Result<TransactionOutcome> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let step = self
            .script
            .get(call)
            .or(self.script.last())
            .copied()
            .unwrap_or(Step::Succeed);
        match step {
            Step::Succeed => Ok(TransactionOutcome::success(
                Some(format!("digest-{}", call)),
                "ok",
            )),
            Step::FailStatus => Ok(TransactionOutcome::failure("MoveAbort")),
            Step::Error => Err(anyhow!("connection reset")),
        }
    }
}

#[derive(Default)]
pub struct CountingObserver {
    pub started: AtomicU32,
    pub retries: AtomicU32,
    pub exhausted: AtomicU32,
    pub succeeded: AtomicU32,
    pub skipped: Mutex<Vec<String>>,
    pub short_circuited: Mutex<Vec<String>>,
    pub events: Mutex<Vec<String>>,
}

impl ProgressObserver for CountingObserver {
    fn attempt_started(&self, label: &str, attempt: u32, _max: u32) {
        self.started.fetch_add(1, Ordering::SeqCst);
        self.events
            .lock()
            .unwrap()
            .push(format!("start {} #{}", label, attempt));
    }

    fn attempt_succeeded(&self, label: &str, _outcome: &TransactionOutcome, _elapsed: Duration) {
        self.succeeded.fetch_add(1, Ordering::SeqCst);
        self.events.lock().unwrap().push(format!("success {}", label));
    }

    fn attempt_failed(
        &self,
        label: &str,
        _attempt: u32,
        _max: u32,
        _error: &str,
        retry_in: Option<Duration>,
    ) {
        match retry_in {
            Some(_) => {
                self.retries.fetch_add(1, Ordering::SeqCst);
                self.events.lock().unwrap().push(format!("retry {}", label));
            }
            None => {
                self.exhausted.fetch_add(1, Ordering::SeqCst);
                self.events.lock().unwrap().push(format!("failed {}", label));
            }
        }
    }

    fn operation_skipped(&self, label: &str) {
        self.skipped.lock().unwrap().push(label.to_string());
    }

    fn sequence_short_circuited(&self, label: &str) {
        self.short_circuited.lock().unwrap().push(label.to_string());
    }
}
