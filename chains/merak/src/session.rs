use crate::client::SuiClient;
use crate::config::MerakConfig;
use crate::task::TaskContext;
use crate::wallet::SuiKeypair;
use alloy_primitives::U256;
use anyhow::Result;
use async_trait::async_trait;
use core_logic::{ContextProvider, ProxyEndpoint, WalletCredential};
use std::sync::Arc;
use tracing::{info, warn};

const MIST_PER_SUI: u128 = 1_000_000_000;

/// Opens a node connection per wallet, through its proxy when one is assigned.
pub struct SuiSessionProvider {
    config: Arc<MerakConfig>,
}

impl SuiSessionProvider {
    pub fn new(config: Arc<MerakConfig>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ContextProvider<SuiKeypair> for SuiSessionProvider {
    type Context = TaskContext;

    async fn connect(
        &self,
        wallet: &SuiKeypair,
        proxy: Option<&ProxyEndpoint>,
    ) -> Result<TaskContext> {
        let rpc_url = self.config.rpc_endpoint();

        let client = match proxy {
            Some(p) => match SuiClient::new(rpc_url, Some(p)) {
                Ok(client) => {
                    info!("NETWORK Connected via proxy {}", p);
                    client
                }
                Err(e) => {
                    warn!(
                        "Failed to setup proxy: {:#}. Continuing with direct connection.",
                        e
                    );
                    SuiClient::new(rpc_url, None)?
                }
            },
            None => {
                info!("NETWORK Connected directly to {}", self.config.network);
                SuiClient::new(rpc_url, None)?
            }
        };

        Ok(TaskContext {
            client,
            keypair: wallet.clone(),
            address: wallet.address(),
            config: Arc::clone(&self.config),
        })
    }

    /// Skips wallets that cannot cover the wrap amount. A failed lookup is not fatal.
    async fn preflight(&self, ctx: &TaskContext) -> Result<bool> {
        if !self.config.run.check_balance_before_transactions {
            return Ok(true);
        }

        match ctx.client.get_balance(&ctx.address).await {
            Ok(balance) => {
                info!("Balance: {} SUI", format_sui(balance));
                if U256::from(balance) < self.config.wrap.amount {
                    warn!(
                        "Insufficient balance ({} SUI). Need at least {} MIST. Skipping wallet.",
                        format_sui(balance),
                        self.config.wrap.amount
                    );
                    return Ok(false);
                }
                Ok(true)
            }
            Err(e) => {
                warn!("Failed to check balance: {:#}", e);
                Ok(true)
            }
        }
    }
}

/// MIST to SUI with four decimals, integer arithmetic only.
pub fn format_sui(mist: u128) -> String {
    let whole = mist / MIST_PER_SUI;
    let frac = (mist % MIST_PER_SUI) / 100_000;
    format!("{}.{:04}", whole, frac)
}
