use crate::client::{created_objects_owned_by, execution_status, MoveCall, SUI_COIN_TYPE};
use crate::config::{MoveTarget, WrapConfig};
use crate::task::{outcome_from_response, Task, TaskContext, TaskResult};
use alloy_primitives::U256;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

/// Converts native SUI into the wrapped DEX asset.
///
/// Runs as two transactions: `unsafe_paySui` isolates a coin of exactly
/// `amount`, then the wrapper consumes that coin.
pub struct WrapTask {
    target: MoveTarget,
    shared_object: String,
    amount: U256,
}

impl WrapTask {
    pub fn new(target: MoveTarget, shared_object: String, config: &WrapConfig) -> Self {
        Self {
            target,
            shared_object,
            amount: config.amount,
        }
    }

    pub fn amount_mist(&self) -> Result<u64> {
        if self.amount > U256::from(u64::MAX) {
            bail!("Wrap amount {} exceeds u64", self.amount);
        }
        Ok(self.amount.as_limbs()[0])
    }

    pub fn move_call(&self, coin_id: &str, recipient: &str) -> MoveCall {
        MoveCall {
            package: self.target.package.clone(),
            module: self.target.module.clone(),
            function: self.target.function.clone(),
            type_arguments: vec![SUI_COIN_TYPE.to_string()],
            arguments: vec![
                Value::String(self.shared_object.clone()),
                json!(coin_id),
                json!(recipient),
            ],
        }
    }
}

#[async_trait]
impl Task<TaskContext> for WrapTask {
    fn name(&self) -> &str {
        "wrap"
    }

    async fn run(&self, ctx: &TaskContext) -> Result<TaskResult> {
        let address = &ctx.address;
        let amount = self.amount_mist()?;

        let coins = ctx.client.get_coins(address).await?;
        if coins.is_empty() {
            bail!("No SUI coins owned by {}", address);
        }
        let coin_ids: Vec<String> = coins.into_iter().map(|c| c.coin_object_id).collect();
        let gas_coin = coin_ids[0].clone();

        let split = ctx
            .client
            .pay_sui(
                address,
                &coin_ids,
                &[address.clone()],
                &[amount],
                ctx.gas_budget(),
            )
            .await
            .context("Failed to build coin split")?;
        let split_response = ctx.sign_and_execute(&split).await?;
        if execution_status(&split_response) != Some("success") {
            return Ok(outcome_from_response(ctx.network(), split_response));
        }

        let coin = created_objects_owned_by(&split_response, address)
            .into_iter()
            .next()
            .context("Coin split created no coin")?;
        debug!("Isolated {} MIST in coin {}", amount, coin);

        let tx = ctx
            .client
            .move_call(
                address,
                &self.move_call(&coin, address),
                Some(&gas_coin),
                ctx.gas_budget(),
            )
            .await
            .context("Failed to build wrap call")?;
        let response = ctx.sign_and_execute(&tx).await?;

        Ok(outcome_from_response(ctx.network(), response))
    }
}
