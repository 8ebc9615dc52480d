use crate::client::MoveCall;
use crate::config::{MoveTarget, SwapConfig};
use crate::task::{outcome_from_response, Task, TaskContext, TaskResult};
use alloy_primitives::U256;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{json, Value};

/// Exact-input swap along an asset-id path.
pub struct SwapTask {
    name: String,
    target: MoveTarget,
    shared_object: String,
    amount: U256,
    min_output: U256,
    path: Vec<U256>,
}

impl SwapTask {
    pub fn new(target: MoveTarget, shared_object: String, config: &SwapConfig) -> Self {
        Self {
            name: config.name.clone(),
            target,
            shared_object,
            amount: config.amount,
            min_output: config.min_output,
            path: config.path.clone(),
        }
    }

    /// `(shared_object, amount: u256, min_output: u256, path: vector<u256>, recipient)`
    pub fn move_call(&self, recipient: &str) -> MoveCall {
        let path: Vec<String> = self.path.iter().map(U256::to_string).collect();
        MoveCall {
            package: self.target.package.clone(),
            module: self.target.module.clone(),
            function: self.target.function.clone(),
            type_arguments: Vec::new(),
            arguments: vec![
                Value::String(self.shared_object.clone()),
                json!(self.amount.to_string()),
                json!(self.min_output.to_string()),
                json!(path),
                json!(recipient),
            ],
        }
    }
}

#[async_trait]
impl Task<TaskContext> for SwapTask {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: &TaskContext) -> Result<TaskResult> {
        let tx = ctx
            .client
            .move_call(&ctx.address, &self.move_call(&ctx.address), None, ctx.gas_budget())
            .await
            .with_context(|| format!("Failed to build swap {}", self.name))?;
        let response = ctx.sign_and_execute(&tx).await?;
        Ok(outcome_from_response(ctx.network(), response))
    }
}
