use crate::config::ProxyEndpoint;
use anyhow::{Context, Result};
use rand::Rng;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

pub struct ProxyManager;

impl ProxyManager {
    pub const PROXY_FILE: &'static str = "proxy.txt";

    /// Loads proxies from a line-oriented file.
    /// A missing file means direct connections, not an error.
    pub fn load_proxies(path: impl AsRef<Path>) -> Result<Vec<ProxyEndpoint>> {
        let path = path.as_ref();
        if !path.exists() {
            info!("{} not found. Running without proxies.", path.display());
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read proxies from {}", path.display()))?;
        let proxies = Self::parse_proxies(&content);

        if !proxies.is_empty() {
            info!("Loaded {} proxies from {}", proxies.len(), path.display());
        }
        Ok(proxies)
    }

    pub fn parse_proxies(content: &str) -> Vec<ProxyEndpoint> {
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .enumerate()
            .filter_map(|(index, line)| match ProxyEndpoint::parse(line) {
                Ok(proxy) => Some(proxy),
                Err(e) => {
                    warn!("Skipping proxy at line {}: {}", index + 1, e);
                    None
                }
            })
            .collect()
    }

    /// Round-robin by wallet index when `rotate`, otherwise a uniform random pick.
    pub fn select_proxy(
        proxies: &[ProxyEndpoint],
        wallet_index: usize,
        rotate: bool,
    ) -> Option<&ProxyEndpoint> {
        if proxies.is_empty() {
            return None;
        }
        let idx = if rotate {
            wallet_index % proxies.len()
        } else {
            rand::thread_rng().gen_range(0..proxies.len())
        };
        proxies.get(idx)
    }
}
