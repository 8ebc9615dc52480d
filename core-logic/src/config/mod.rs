use crate::error::{ConfigError, NetworkError};
use crate::utils::retry::RetryConfig;
use crate::utils::runner::RunSettings;
use crate::utils::sequencer::SequenceSettings;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Chain-agnostic run settings shared by every bot built on core-logic.
///
/// Missing keys fall back to [`RunConfig::default`], so a partial `[run]`
/// table only overrides what it names.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RunConfig {
    /// Attempts per operation, including the first one
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    /// 1.0 keeps the retry delay fixed
    pub retry_backoff: f64,
    pub max_retry_delay_ms: u64,
    pub delay_between_tx_ms: u64,
    pub delay_between_wallets_ms: u64,
    pub check_balance_before_transactions: bool,
    pub track_transactions: bool,
    pub use_jitter: bool,
    pub rotate_proxies: bool,
    /// Remaining-time tick while waiting between operations (0 disables)
    pub countdown_tick_ms: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay_ms: 5_000,
            retry_backoff: 1.0,
            max_retry_delay_ms: 60_000,
            delay_between_tx_ms: 60_000,
            delay_between_wallets_ms: 60_000,
            check_balance_before_transactions: true,
            track_transactions: false,
            use_jitter: true,
            rotate_proxies: true,
            countdown_tick_ms: 10_000,
        }
    }
}

impl RunConfig {
    const FALLBACK_WALLET_DELAY_MS: u64 = 5_000;

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_retries == 0 {
            return Err(ConfigError::InvalidValue {
                field: "run.max_retries".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if !self.retry_backoff.is_finite() || self.retry_backoff < 1.0 {
            return Err(ConfigError::InvalidValue {
                field: "run.retry_backoff".to_string(),
                reason: format!("must be >= 1.0, got {}", self.retry_backoff),
            });
        }
        Ok(())
    }

    /// A zero wallet delay falls back to the transaction delay, then to 5s.
    pub fn effective_wallet_delay_ms(&self) -> u64 {
        if self.delay_between_wallets_ms > 0 {
            self.delay_between_wallets_ms
        } else if self.delay_between_tx_ms > 0 {
            self.delay_between_tx_ms
        } else {
            Self::FALLBACK_WALLET_DELAY_MS
        }
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::new(self.max_retries, self.retry_delay_ms)
            .with_backoff(self.retry_backoff)
            .with_max_delay(self.max_retry_delay_ms.max(self.retry_delay_ms))
    }

    pub fn sequence_settings(&self) -> SequenceSettings {
        SequenceSettings {
            delay_between_ops_ms: self.delay_between_tx_ms,
            use_jitter: self.use_jitter,
            countdown_tick_ms: self.countdown_tick_ms,
        }
    }

    pub fn run_settings(&self) -> RunSettings {
        RunSettings {
            delay_between_wallets_ms: self.effective_wallet_delay_ms(),
            use_jitter: self.use_jitter,
            rotate_proxies: self.rotate_proxies,
        }
    }
}

/// An HTTP(S) proxy, credentials kept apart from the base URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyEndpoint {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl ProxyEndpoint {
    /// Accepts `scheme://[user:pass@]host:port` or `host:port[:user:pass]`.
    pub fn parse(line: &str) -> Result<Self, NetworkError> {
        let line = line.trim();
        let invalid = |reason: &str| NetworkError::InvalidProxy {
            url: mask_credentials(line),
            reason: reason.to_string(),
        };

        if line.contains("://") {
            let u = url::Url::parse(line).map_err(|e| invalid(&e.to_string()))?;
            let host = u.host_str().ok_or_else(|| invalid("missing host"))?;
            let port = u
                .port_or_known_default()
                .ok_or_else(|| invalid("missing port"))?;
            let username = (!u.username().is_empty()).then(|| u.username().to_string());
            let password = u.password().map(str::to_string);

            return Ok(Self {
                url: format!("{}://{}:{}", u.scheme(), host, port),
                username,
                password,
            });
        }

        // ip:port:user:pass -> 4 parts
        // ip:port -> 2 parts
        let parts: Vec<&str> = line.split(':').map(str::trim).collect();
        if parts.len() != 2 && parts.len() != 4 {
            return Err(invalid("expected host:port or host:port:user:pass"));
        }
        if parts[0].is_empty() {
            return Err(invalid("missing host"));
        }
        let port: u16 = parts[1].parse().map_err(|_| invalid("invalid port"))?;
        let (username, password) = if parts.len() == 4 {
            (Some(parts[2].to_string()), Some(parts[3].to_string()))
        } else {
            (None, None)
        };

        Ok(Self {
            url: format!("http://{}:{}", parts[0], port),
            username,
            password,
        })
    }
}

impl fmt::Display for ProxyEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.url.split_once("://") {
            Some((scheme, rest)) if self.username.is_some() => {
                write!(f, "{}://***@{}", scheme, rest)
            }
            _ => write!(f, "{}", self.url),
        }
    }
}

/// Replaces `//user:pass@` with `//***@` for log output.
pub fn mask_credentials(raw: &str) -> String {
    match (raw.find("://"), raw.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***@{}", &raw[..scheme_end], &raw[at + 1..])
        }
        _ => raw.to_string(),
    }
}
