use anyhow::{Context, Result};
use core_logic::{NetworkError, ProxyEndpoint};
use reqwest::{Client, Proxy};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

pub const SUI_COIN_TYPE: &str = "0x2::sui::SUI";
const MAX_COIN_PAGES: usize = 10;

/// Unsigned transaction returned by the `unsafe_*` builders.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionBytes {
    pub tx_bytes: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinObject {
    pub coin_object_id: String,
    pub balance: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CoinPage {
    data: Vec<CoinObject>,
    next_cursor: Option<String>,
    #[serde(default)]
    has_next_page: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Balance {
    total_balance: String,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<RpcErrorBody>,
}

/// One Move call, arguments already in Sui JSON form.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveCall {
    pub package: String,
    pub module: String,
    pub function: String,
    pub type_arguments: Vec<String>,
    pub arguments: Vec<Value>,
}

/// Minimal Sui full-node JSON-RPC client.
pub struct SuiClient {
    http: Client,
    rpc_url: String,
    next_id: AtomicU64,
}

impl SuiClient {
    pub fn new(rpc_url: &str, proxy: Option<&ProxyEndpoint>) -> Result<Self> {
        let mut client_builder = Client::builder();

        if let Some(proxy_config) = proxy {
            let mut proxy = Proxy::all(&proxy_config.url).context("Failed to create proxy")?;
            if let (Some(username), Some(password)) =
                (&proxy_config.username, &proxy_config.password)
            {
                proxy = proxy.basic_auth(username, password);
            }
            client_builder = client_builder.proxy(proxy);
        }

        let http = client_builder
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build reqwest client")?;

        Ok(Self {
            http,
            rpc_url: rpc_url.to_string(),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        debug!("RPC {} #{}", method, id);

        let response = self
            .http
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("{} request failed", method))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::HttpError {
                status_code: status.as_u16(),
                endpoint: self.rpc_url.clone(),
            }
            .into());
        }

        let envelope: RpcResponse = response.json().await.map_err(|e| {
            NetworkError::InvalidResponse {
                endpoint: self.rpc_url.clone(),
                reason: e.to_string(),
            }
        })?;

        if let Some(err) = envelope.error {
            return Err(NetworkError::RpcError {
                method: method.to_string(),
                code: err.code,
                message: err.message,
            }
            .into());
        }

        let result = envelope.result.ok_or_else(|| NetworkError::InvalidResponse {
            endpoint: self.rpc_url.clone(),
            reason: format!("{} returned no result", method),
        })?;
        serde_json::from_value(result).with_context(|| format!("Unexpected {} result", method))
    }

    /// Total SUI balance in MIST.
    pub async fn get_balance(&self, owner: &str) -> Result<u128> {
        let balance: Balance = self
            .call("suix_getBalance", json!([owner, SUI_COIN_TYPE]))
            .await?;
        balance
            .total_balance
            .parse()
            .with_context(|| format!("Invalid balance '{}'", balance.total_balance))
    }

    /// Every SUI coin object owned by `owner`, largest first.
    pub async fn get_coins(&self, owner: &str) -> Result<Vec<CoinObject>> {
        let mut coins = Vec::new();
        let mut cursor: Option<String> = None;

        for _ in 0..MAX_COIN_PAGES {
            let page: CoinPage = self
                .call("suix_getCoins", json!([owner, SUI_COIN_TYPE, cursor, null]))
                .await?;
            coins.extend(page.data);
            if !page.has_next_page || page.next_cursor.is_none() {
                break;
            }
            cursor = page.next_cursor;
        }

        coins.sort_by_key(|c| std::cmp::Reverse(c.balance.parse::<u128>().unwrap_or(0)));
        Ok(coins)
    }

    /// Builds a transfer that merges `input_coins` and pays `amounts` out of
    /// them. The first input coin pays for gas and keeps the remainder.
    pub async fn pay_sui(
        &self,
        signer: &str,
        input_coins: &[String],
        recipients: &[String],
        amounts: &[u64],
        gas_budget: u64,
    ) -> Result<TransactionBytes> {
        let amounts: Vec<String> = amounts.iter().map(u64::to_string).collect();
        self.call(
            "unsafe_paySui",
            json!([signer, input_coins, recipients, amounts, gas_budget.to_string()]),
        )
        .await
    }

    pub async fn move_call(
        &self,
        signer: &str,
        call: &MoveCall,
        gas: Option<&str>,
        gas_budget: u64,
    ) -> Result<TransactionBytes> {
        self.call(
            "unsafe_moveCall",
            json!([
                signer,
                call.package,
                call.module,
                call.function,
                call.type_arguments,
                call.arguments,
                gas,
                gas_budget.to_string()
            ]),
        )
        .await
    }

    /// Submits a signed transaction and waits for local execution.
    pub async fn execute_transaction(&self, tx_bytes: &str, signature: &str) -> Result<Value> {
        self.call(
            "sui_executeTransactionBlock",
            json!([
                tx_bytes,
                [signature],
                { "showEffects": true, "showEvents": true },
                "WaitForLocalExecution"
            ]),
        )
        .await
    }
}

/// `effects.status.status` of an executed transaction.
pub fn execution_status(response: &Value) -> Option<&str> {
    response
        .pointer("/effects/status/status")
        .and_then(Value::as_str)
}

/// `effects.status.error`, set by the node on failure.
pub fn execution_error(response: &Value) -> Option<&str> {
    response
        .pointer("/effects/status/error")
        .and_then(Value::as_str)
}

/// Object ids created by the transaction and owned by `owner`.
pub fn created_objects_owned_by(response: &Value, owner: &str) -> Vec<String> {
    let Some(created) = response.pointer("/effects/created").and_then(Value::as_array) else {
        return Vec::new();
    };

    created
        .iter()
        .filter(|obj| {
            obj.pointer("/owner/AddressOwner")
                .and_then(Value::as_str)
                .is_some_and(|o| o.eq_ignore_ascii_case(owner))
        })
        .filter_map(|obj| obj.pointer("/reference/objectId").and_then(Value::as_str))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn effects() -> Value {
        json!({
            "digest": "8cZk",
            "effects": {
                "status": { "status": "success" },
                "created": [
                    { "owner": { "AddressOwner": "0xabc" }, "reference": { "objectId": "0xc01" } },
                    { "owner": { "Shared": { "initial_shared_version": 3 } }, "reference": { "objectId": "0xc02" } },
                    { "owner": { "AddressOwner": "0xdef" }, "reference": { "objectId": "0xc03" } }
                ]
            }
        })
    }

    #[test]
    fn test_status_extraction() {
        assert_eq!(execution_status(&effects()), Some("success"));

        let failed = json!({ "effects": { "status": { "status": "failure", "error": "InsufficientGas" } } });
        assert_eq!(execution_status(&failed), Some("failure"));
        assert_eq!(execution_error(&failed), Some("InsufficientGas"));
        assert_eq!(execution_status(&json!({})), None);
    }

    #[test]
    fn test_created_objects_filtered_by_owner() {
        assert_eq!(created_objects_owned_by(&effects(), "0xABC"), vec!["0xc01"]);
        assert!(created_objects_owned_by(&json!({}), "0xabc").is_empty());
    }

    #[test]
    fn test_proxy_client_builds() {
        let proxy = ProxyEndpoint::parse("10.0.0.1:8080:user:pass").unwrap();
        let client = SuiClient::new("http://127.0.0.1:9000", Some(&proxy)).unwrap();
        assert_eq!(client.rpc_url(), "http://127.0.0.1:9000");
    }
}
