use crate::client::{execution_error, execution_status, SuiClient, TransactionBytes};
use crate::config::{MerakConfig, SuiNetwork};
use crate::wallet::SuiKeypair;
use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use core_logic::{ConfigError, OperationCategory, OperationSpec, TransactionOutcome};
use serde_json::Value;
use std::sync::Arc;

pub mod t01_wrap;
pub mod t02_swap;
pub mod t03_add_liquidity;

pub use self::t01_wrap::WrapTask;
pub use self::t02_swap::SwapTask;
pub use self::t03_add_liquidity::AddLiquidityTask;

pub use core_logic::traits::{Task, TransactionOutcome as TaskResult};

/// Everything a task needs for one wallet.
pub struct TaskContext {
    pub client: SuiClient,
    pub keypair: SuiKeypair,
    pub address: String,
    pub config: Arc<MerakConfig>,
}

impl TaskContext {
    pub fn network(&self) -> SuiNetwork {
        self.config.network
    }

    pub fn gas_budget(&self) -> u64 {
        self.config.gas_budget
    }

    /// Signs the node-built transaction and waits for its effects.
    pub async fn sign_and_execute(&self, tx: &TransactionBytes) -> Result<Value> {
        let bytes = STANDARD
            .decode(&tx.tx_bytes)
            .context("Node returned malformed txBytes")?;
        let signature = self.keypair.sign_transaction(&bytes);
        self.client.execute_transaction(&tx.tx_bytes, &signature).await
    }
}

/// Classifies an executed transaction by `effects.status`.
pub fn outcome_from_response(network: SuiNetwork, response: Value) -> TransactionOutcome {
    match execution_status(&response) {
        Some("success") => {
            let digest = response
                .get("digest")
                .and_then(Value::as_str)
                .map(str::to_string);
            let message = digest
                .as_deref()
                .map(|d| network.explorer_tx_url(d))
                .unwrap_or_default();
            TransactionOutcome::success(digest, message).with_raw(response)
        }
        status => {
            let status = status.unwrap_or("unknown");
            let error = match execution_error(&response) {
                Some(detail) => format!("{} ({})", status, detail),
                None => status.to_string(),
            };
            TransactionOutcome::failure(error).with_raw(response)
        }
    }
}

/// The wallet sequence: wrap (critical), swaps, then liquidity, in config order.
/// Keys are `wrap`, `swap.<name>` and `liquidity.<name>`.
pub fn build_operations(config: &MerakConfig) -> Result<Vec<OperationSpec<TaskContext>>, ConfigError> {
    let shared_object = config.contracts.shared_object.clone();
    let mut specs = Vec::with_capacity(1 + config.swaps.len() + config.liquidity.len());

    specs.push(OperationSpec {
        name: "wrap".to_string(),
        label: config.wrap.label.clone(),
        category: OperationCategory::Wrap,
        enabled: config.wrap.enabled,
        critical: true,
        task: Arc::new(WrapTask::new(
            config.wrap_target()?,
            shared_object.clone(),
            &config.wrap,
        )),
    });

    let dex_target = config.dex_target()?;
    for swap in &config.swaps {
        specs.push(OperationSpec {
            name: format!("swap.{}", swap.name),
            label: swap.label.clone(),
            category: OperationCategory::Swap,
            enabled: swap.enabled,
            critical: false,
            task: Arc::new(SwapTask::new(dex_target.clone(), shared_object.clone(), swap)),
        });
    }

    let lp_target = config.add_liquidity_target()?;
    for pool in &config.liquidity {
        specs.push(OperationSpec {
            name: format!("liquidity.{}", pool.name),
            label: pool.label.clone(),
            category: OperationCategory::Liquidity,
            enabled: pool.enabled,
            critical: false,
            task: Arc::new(AddLiquidityTask::new(
                lp_target.clone(),
                shared_object.clone(),
                pool,
            )),
        });
    }

    Ok(specs)
}
