//! # Core Logic - Shared Engine for Testnet Bots
//!
//! This crate provides the chain-agnostic part of the bots: loading wallets
//! and proxies, running a fixed sequence of operations per wallet with
//! retries, and aggregating run statistics.
//!
//! ## Modules
//!
//! - [`config`] - Run settings and proxy endpoints
//! - [`error`] - Typed error handling with thiserror
//! - [`reporter`] - Progress observers (tracing output, no-op)
//! - [`traits`] - Task, wallet and context-provider traits, outcome and stats types
//! - `utils` - Pause/jitter, loaders, executor, sequencer, runner, recorder, logger
//!
//! ## Execution model
//!
//! One submission is in flight at a time across the whole run: wallets are
//! processed one after another, and each wallet's operations run in order.
//! Per-wallet statistics are owned by the sequencer call that produced them
//! and handed to the runner only once the sequence has finished.

// Module declarations - internal modules marked pub(crate)
pub mod config;
pub mod error;
pub mod reporter;
pub mod traits;
pub(crate) mod utils;

// Selective exports - only public API types
pub use config::{mask_credentials, ProxyEndpoint, RunConfig};
pub use error::{ConfigError, ExecutionError, LoadError, NetworkError, WalletError};
pub use reporter::{NoopObserver, ProgressObserver, TracingReporter};
pub use traits::{
    ContextProvider, OutcomeStatus, RunStats, Task, TransactionOutcome, WalletCredential,
    WalletStats,
};

// Utils are pub(crate) - only export specific public utilities
pub use utils::{
    countdown, jittered_delay, pause, progress_percent, setup_logger, short_address,
    OperationCategory, OperationSequencer, OperationSpec, OperationSummary, ProxyManager,
    RejectedLine, RetryConfig, RunReport, RunSettings, SequenceReport, SequenceSettings,
    SequenceState, TransactionExecutor, TransactionRecorder, WalletLoadReport, WalletManager,
    WorkerRunner,
};
