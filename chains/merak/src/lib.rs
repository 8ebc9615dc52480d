//! # Merak Bot
//!
//! Sui adapter for the core-logic engine: drives wallets through the Dubhe
//! DEX sequence (wrap, swaps, liquidity deposits).

pub mod client;
pub mod config;
pub mod session;
pub mod task;
pub mod wallet;

pub use config::MerakConfig;
pub use session::SuiSessionProvider;
pub use task::{build_operations, TaskContext};
pub use wallet::SuiKeypair;
