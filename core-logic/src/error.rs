//! # Core Error Types
//!
//! Centralized error definitions for the core-logic crate.
//! All errors implement `std::error::Error` and `std::fmt::Display`.

use thiserror::Error;

/// Configuration-related errors
#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    #[error("Invalid RPC URL format: '{url}'")]
    InvalidRpcUrl { url: String },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Duplicate operation name: '{name}'")]
    DuplicateOperation { name: String },

    #[error("Unknown network '{network}' (expected mainnet, testnet, devnet or localnet)")]
    UnknownNetwork { network: String },
}

/// Errors raised while reading line-oriented source files
#[derive(Error, Debug, Clone)]
pub enum LoadError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("I/O error reading {path}: {msg}")]
    IoError { path: String, msg: String },

    #[error("No valid wallets found in {path}")]
    NoValidWallets { path: String },
}

/// Wallet and key derivation errors
#[derive(Error, Debug, Clone)]
pub enum WalletError {
    #[error("Invalid mnemonic phrase: {reason}")]
    InvalidMnemonic { reason: String },

    #[error("Key derivation failed: {reason}")]
    DerivationFailed { reason: String },
}

/// Network and RPC-related errors
#[derive(Error, Debug, Clone)]
pub enum NetworkError {
    #[error("Invalid proxy URL '{url}': {reason}")]
    InvalidProxy { url: String, reason: String },

    #[error("HTTP error {status_code} from {endpoint}")]
    HttpError { status_code: u16, endpoint: String },

    #[error("RPC error {code} from {method}: {message}")]
    RpcError {
        method: String,
        code: i64,
        message: String,
    },

    #[error("Invalid response from {endpoint}: {reason}")]
    InvalidResponse { endpoint: String, reason: String },
}

/// Errors that escape the transaction executor
#[derive(Error, Debug, Clone)]
pub enum ExecutionError {
    #[error("{label} failed after {attempts} attempts: {reason}")]
    CriticalExhausted {
        label: String,
        attempts: u32,
        reason: String,
    },
}
