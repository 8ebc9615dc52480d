use crate::client::MoveCall;
use crate::config::{LiquidityConfig, MoveTarget};
use crate::task::{outcome_from_response, Task, TaskContext, TaskResult};
use alloy_primitives::U256;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{json, Value};

pub struct AddLiquidityTask {
    name: String,
    target: MoveTarget,
    shared_object: String,
    assets: (U256, U256),
    amounts: (U256, U256),
    minimums: (U256, U256),
}

impl AddLiquidityTask {
    pub fn new(target: MoveTarget, shared_object: String, config: &LiquidityConfig) -> Self {
        Self {
            name: config.name.clone(),
            target,
            shared_object,
            assets: (config.asset0, config.asset1),
            amounts: (config.amount0, config.amount1),
            minimums: (config.min0, config.min1),
        }
    }

    /// `(shared_object, asset0, asset1, amount0, amount1, min0, min1, recipient)`
    pub fn move_call(&self, recipient: &str) -> MoveCall {
        let u256 = |v: U256| json!(v.to_string());
        MoveCall {
            package: self.target.package.clone(),
            module: self.target.module.clone(),
            function: self.target.function.clone(),
            type_arguments: Vec::new(),
            arguments: vec![
                Value::String(self.shared_object.clone()),
                u256(self.assets.0),
                u256(self.assets.1),
                u256(self.amounts.0),
                u256(self.amounts.1),
                u256(self.minimums.0),
                u256(self.minimums.1),
                json!(recipient),
            ],
        }
    }
}

#[async_trait]
impl Task<TaskContext> for AddLiquidityTask {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: &TaskContext) -> Result<TaskResult> {
        let tx = ctx
            .client
            .move_call(&ctx.address, &self.move_call(&ctx.address), None, ctx.gas_budget())
            .await
            .with_context(|| format!("Failed to build liquidity deposit {}", self.name))?;
        let response = ctx.sign_and_execute(&tx).await?;
        Ok(outcome_from_response(ctx.network(), response))
    }
}
