use crate::error::LoadError;
use anyhow::Result;
use std::fs;
use std::path::Path;
use tracing::{info, warn};
use zeroize::Zeroizing;

/// A secret line that failed to derive into a wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedLine {
    /// 1-based position among non-blank, non-comment lines
    pub line: usize,
    pub reason: String,
}

#[derive(Debug)]
pub struct WalletLoadReport<W> {
    pub wallets: Vec<W>,
    pub rejected: Vec<RejectedLine>,
}

pub struct WalletManager;

impl WalletManager {
    pub const MNEMONIC_FILE: &'static str = "mnemonic.txt";

    /// Reads one secret phrase per line and derives a wallet from each.
    /// Lines that fail to derive are dropped with a warning.
    pub fn load_wallets<W, F>(path: impl AsRef<Path>, derive: F) -> Result<WalletLoadReport<W>, LoadError>
    where
        F: Fn(&str) -> Result<W>,
    {
        let path = path.as_ref();
        if !path.exists() {
            return Err(LoadError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let content = Zeroizing::new(fs::read_to_string(path).map_err(|e| LoadError::IoError {
            path: path.display().to_string(),
            msg: e.to_string(),
        })?);

        info!("Loading wallet keys from {}", path.display());
        Ok(Self::parse_wallets(&content, derive))
    }

    pub fn parse_wallets<W, F>(content: &str, derive: F) -> WalletLoadReport<W>
    where
        F: Fn(&str) -> Result<W>,
    {
        let mut wallets = Vec::new();
        let mut rejected = Vec::new();

        let phrases = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'));

        for (index, phrase) in phrases.enumerate() {
            match derive(phrase) {
                Ok(wallet) => wallets.push(wallet),
                Err(e) => {
                    let line = index + 1;
                    warn!("Mnemonic at line {} is invalid: {}", line, e);
                    rejected.push(RejectedLine {
                        line,
                        reason: e.to_string(),
                    });
                }
            }
        }

        WalletLoadReport { wallets, rejected }
    }

    /// Like [`Self::load_wallets`] but an empty result is fatal.
    pub fn load_required<W, F>(path: impl AsRef<Path>, derive: F) -> Result<Vec<W>, LoadError>
    where
        F: Fn(&str) -> Result<W>,
    {
        let path = path.as_ref();
        let report = Self::load_wallets(path, derive)?;
        if report.wallets.is_empty() {
            return Err(LoadError::NoValidWallets {
                path: path.display().to_string(),
            });
        }

        let count = report.wallets.len();
        info!("Loaded {} wallet{}", count, if count > 1 { "s" } else { "" });
        Ok(report.wallets)
    }
}
