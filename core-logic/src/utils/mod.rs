//! # Utilities Module
//!
//! Internal utility modules for the core-logic crate.
//! These modules are marked as `pub(crate)` to enforce API boundaries.

// Internal modules - not part of public API
pub(crate) mod logger;
pub(crate) mod delay;
pub(crate) mod proxy_manager;
pub(crate) mod recorder;
pub(crate) mod retry;
pub(crate) mod runner;
pub(crate) mod sequencer;
pub(crate) mod wallet_manager;

// Selective exports - only public utilities
pub use logger::setup_logger;
pub use delay::{countdown, jittered_delay, pause};
pub use proxy_manager::ProxyManager;
pub use recorder::TransactionRecorder;
pub use retry::{RetryConfig, TransactionExecutor};
pub use runner::{progress_percent, short_address, RunReport, RunSettings, WorkerRunner};
pub use sequencer::{
    OperationCategory, OperationSequencer, OperationSpec, OperationSummary, SequenceReport,
    SequenceSettings, SequenceState,
};
pub use wallet_manager::{RejectedLine, WalletLoadReport, WalletManager};
