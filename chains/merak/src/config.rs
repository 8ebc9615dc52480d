use alloy_primitives::U256;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use core_logic::{ConfigError, RunConfig};
use serde::{Deserialize, Deserializer};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::{info, warn};

const PACKAGE_ID: &str = "0xa6477a6bf50e2389383b34a76d59ccfbec766ff2decefe38e1d8436ef8a9b245";
const SHARED_OBJECT: &str = "0x8ece4cb6de126eb5c7a375f90c221bdc16c81ad8f6f894af08e0b6c25fb50a45";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum SuiNetwork {
    Mainnet,
    Testnet,
    Devnet,
    Localnet,
}

impl SuiNetwork {
    pub fn fullnode_url(&self) -> &'static str {
        match self {
            SuiNetwork::Mainnet => "https://fullnode.mainnet.sui.io:443",
            SuiNetwork::Testnet => "https://fullnode.testnet.sui.io:443",
            SuiNetwork::Devnet => "https://fullnode.devnet.sui.io:443",
            SuiNetwork::Localnet => "http://127.0.0.1:9000",
        }
    }

    /// Suivision link; mainnet has no subdomain prefix.
    pub fn explorer_tx_url(&self, digest: &str) -> String {
        match self {
            SuiNetwork::Mainnet => format!("https://suivision.xyz/txblock/{}", digest),
            other => format!("https://{}.suivision.xyz/txblock/{}", other, digest),
        }
    }
}

impl fmt::Display for SuiNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SuiNetwork::Mainnet => "mainnet",
            SuiNetwork::Testnet => "testnet",
            SuiNetwork::Devnet => "devnet",
            SuiNetwork::Localnet => "localnet",
        };
        f.write_str(name)
    }
}

impl FromStr for SuiNetwork {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(SuiNetwork::Mainnet),
            "testnet" => Ok(SuiNetwork::Testnet),
            "devnet" => Ok(SuiNetwork::Devnet),
            "localnet" => Ok(SuiNetwork::Localnet),
            _ => Err(ConfigError::UnknownNetwork {
                network: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for SuiNetwork {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// `package::module::function`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveTarget {
    pub package: String,
    pub module: String,
    pub function: String,
}

impl MoveTarget {
    pub fn parse(field: &str, raw: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidValue {
            field: field.to_string(),
            reason: format!("{} ('{}')", reason, raw),
        };

        let parts: Vec<&str> = raw.trim().split("::").collect();
        let [package, module, function] = parts.as_slice() else {
            return Err(invalid("expected package::module::function"));
        };
        if !is_object_id(package) {
            return Err(invalid("package must be a 0x-prefixed hex id"));
        }
        if !is_identifier(module) || !is_identifier(function) {
            return Err(invalid("module and function must be Move identifiers"));
        }

        Ok(Self {
            package: package.to_string(),
            module: module.to_string(),
            function: function.to_string(),
        })
    }
}

impl fmt::Display for MoveTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}::{}", self.package, self.module, self.function)
    }
}

fn is_object_id(s: &str) -> bool {
    match s.strip_prefix("0x") {
        Some(hex) => !hex.is_empty() && hex.len() <= 64 && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ContractsConfig {
    pub wrap_target: String,
    pub dex_target: String,
    pub add_liquidity_target: String,
    pub shared_object: String,
}

impl Default for ContractsConfig {
    fn default() -> Self {
        Self {
            wrap_target: format!("{}::dubhe_wrapper_system::wrap", PACKAGE_ID),
            dex_target: format!("{}::dubhe_dex_system::swap_exact_tokens_for_tokens", PACKAGE_ID),
            add_liquidity_target: format!("{}::dubhe_dex_system::add_liquidity", PACKAGE_ID),
            shared_object: SHARED_OBJECT.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct WrapConfig {
    pub enabled: bool,
    /// MIST
    #[serde(deserialize_with = "deserialize_u256")]
    pub amount: U256,
    pub label: String,
}

impl Default for WrapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            amount: U256::from(100_000_000u64),
            label: "SUI Wrapping".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SwapConfig {
    pub name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(deserialize_with = "deserialize_u256")]
    pub amount: U256,
    /// Asset ids, input first
    #[serde(deserialize_with = "deserialize_u256_vec")]
    pub path: Vec<U256>,
    #[serde(default = "default_min", deserialize_with = "deserialize_u256")]
    pub min_output: U256,
    pub label: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LiquidityConfig {
    pub name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(deserialize_with = "deserialize_u256")]
    pub asset0: U256,
    #[serde(deserialize_with = "deserialize_u256")]
    pub asset1: U256,
    #[serde(deserialize_with = "deserialize_u256")]
    pub amount0: U256,
    #[serde(deserialize_with = "deserialize_u256")]
    pub amount1: U256,
    #[serde(default = "default_min", deserialize_with = "deserialize_u256")]
    pub min0: U256,
    #[serde(default = "default_min", deserialize_with = "deserialize_u256")]
    pub min1: U256,
    pub label: String,
}

fn default_enabled() -> bool {
    true
}

fn default_min() -> U256 {
    U256::from(1u64)
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MerakConfig {
    pub network: SuiNetwork,
    /// Overrides the public full node picked from `network`
    pub rpc_url: Option<String>,
    /// MIST per transaction
    pub gas_budget: u64,
    pub run: RunConfig,
    pub contracts: ContractsConfig,
    pub wrap: WrapConfig,
    pub swaps: Vec<SwapConfig>,
    pub liquidity: Vec<LiquidityConfig>,
}

impl Default for MerakConfig {
    fn default() -> Self {
        Self {
            network: SuiNetwork::Testnet,
            rpc_url: None,
            gas_budget: 50_000_000,
            run: RunConfig::default(),
            contracts: ContractsConfig::default(),
            wrap: WrapConfig::default(),
            swaps: vec![
                swap("wSUI_wDUBHE", 10_000_000, [0, 1], "wSUI → wDUBHE Swap"),
                swap("wDUBHE_wSUI", 1_000, [1, 0], "wDUBHE → wSUI Swap"),
                swap("wSUI_wSTARS", 10_000_000, [0, 3], "wSUI → wSTARS Swap"),
                swap("wSTARS_wSUI", 1_000, [3, 0], "wSTARS → wSUI Swap"),
            ],
            liquidity: vec![
                pool("wSUI_wSTARS", (0, 3), (1_000_000, 19_149), "wSUI-wSTARS LP Deposit"),
                pool("wSUI_wDUBHE", (0, 1), (1_000_000, 5_765), "wSUI-wDUBHE LP Deposit"),
                pool("wDUBHE_wSTARS", (1, 3), (2_000, 13_873), "wDUBHE-wSTARS LP Deposit"),
            ],
        }
    }
}

fn swap(name: &str, amount: u64, path: [u64; 2], label: &str) -> SwapConfig {
    SwapConfig {
        name: name.to_string(),
        enabled: true,
        amount: U256::from(amount),
        path: path.iter().map(|&p| U256::from(p)).collect(),
        min_output: default_min(),
        label: label.to_string(),
    }
}

fn pool(name: &str, assets: (u64, u64), amounts: (u64, u64), label: &str) -> LiquidityConfig {
    LiquidityConfig {
        name: name.to_string(),
        enabled: true,
        asset0: U256::from(assets.0),
        asset1: U256::from(assets.1),
        amount0: U256::from(amounts.0),
        amount1: U256::from(amounts.1),
        min0: default_min(),
        min1: default_min(),
        label: label.to_string(),
    }
}

impl MerakConfig {
    /// Built-in defaults, then `path` when it exists, then `MERAK__*` variables.
    pub fn load(path: &str) -> Result<Self> {
        let mut builder = Config::builder();

        if Path::new(path).exists() {
            info!("Loading config from: {}", path);
            builder = builder.add_source(File::with_name(path));
        } else {
            warn!("{} not found. Using built-in defaults.", path);
        }

        let settings = builder
            .add_source(
                Environment::with_prefix("MERAK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to read configuration from {}", path))?;

        settings
            .try_deserialize()
            .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))
    }

    /// Parses a TOML document on top of the built-in defaults.
    pub fn from_toml(content: &str) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::from_str(content, config::FileFormat::Toml))
            .build()?;
        settings.try_deserialize().map_err(|e| anyhow::anyhow!(e))
    }

    pub fn rpc_endpoint(&self) -> &str {
        self.rpc_url
            .as_deref()
            .unwrap_or_else(|| self.network.fullnode_url())
    }

    pub fn wrap_target(&self) -> Result<MoveTarget, ConfigError> {
        MoveTarget::parse("contracts.wrap_target", &self.contracts.wrap_target)
    }

    pub fn dex_target(&self) -> Result<MoveTarget, ConfigError> {
        MoveTarget::parse("contracts.dex_target", &self.contracts.dex_target)
    }

    pub fn add_liquidity_target(&self) -> Result<MoveTarget, ConfigError> {
        MoveTarget::parse(
            "contracts.add_liquidity_target",
            &self.contracts.add_liquidity_target,
        )
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.run.validate()?;

        if let Some(url) = &self.rpc_url {
            url::Url::parse(url).map_err(|_| ConfigError::InvalidRpcUrl { url: url.clone() })?;
        }
        if self.gas_budget == 0 {
            return Err(invalid("gas_budget", "must be greater than zero"));
        }

        self.wrap_target()?;
        self.dex_target()?;
        self.add_liquidity_target()?;
        if !is_object_id(&self.contracts.shared_object) {
            return Err(invalid(
                "contracts.shared_object",
                "must be a 0x-prefixed hex id",
            ));
        }

        if self.wrap.label.trim().is_empty() {
            return Err(invalid("wrap.label", "must not be empty"));
        }
        if self.wrap.amount.is_zero() || self.wrap.amount > U256::from(u64::MAX) {
            return Err(invalid("wrap.amount", "must be between 1 and u64::MAX MIST"));
        }

        let mut names = HashSet::new();
        for s in &self.swaps {
            if !names.insert(s.name.as_str()) {
                return Err(ConfigError::DuplicateOperation {
                    name: s.name.clone(),
                });
            }
            if s.label.trim().is_empty() {
                return Err(invalid(&format!("swaps.{}.label", s.name), "must not be empty"));
            }
            if s.path.len() < 2 {
                return Err(invalid(
                    &format!("swaps.{}.path", s.name),
                    "needs at least two hops",
                ));
            }
        }
        // Swaps and pools are keyed separately.
        names.clear();
        for l in &self.liquidity {
            if !names.insert(l.name.as_str()) {
                return Err(ConfigError::DuplicateOperation {
                    name: l.name.clone(),
                });
            }
            if l.label.trim().is_empty() {
                return Err(invalid(
                    &format!("liquidity.{}.label", l.name),
                    "must not be empty",
                ));
            }
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

// --- U256 amounts ---

struct U256Visitor;

impl<'de> serde::de::Visitor<'de> for U256Visitor {
    type Value = U256;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an unsigned integer or a decimal / 0x-hex string")
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        U256::from_str(value.trim()).map_err(|_| E::custom(format!("invalid u256 '{}'", value)))
    }

    fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(U256::from(value))
    }

    fn visit_u128<E>(self, value: u128) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(U256::from(value))
    }

    fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        if value >= 0 {
            Ok(U256::from(value as u64))
        } else {
            Err(E::custom("negative u256"))
        }
    }
}

struct Amount(U256);

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(U256Visitor).map(Amount)
    }
}

fn deserialize_u256<'de, D>(deserializer: D) -> Result<U256, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(U256Visitor)
}

fn deserialize_u256_vec<'de, D>(deserializer: D) -> Result<Vec<U256>, D::Error>
where
    D: Deserializer<'de>,
{
    let amounts = Vec::<Amount>::deserialize(deserializer)?;
    Ok(amounts.into_iter().map(|a| a.0).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explorer_links() {
        assert_eq!(
            SuiNetwork::Mainnet.explorer_tx_url("Abc"),
            "https://suivision.xyz/txblock/Abc"
        );
        assert_eq!(
            SuiNetwork::Testnet.explorer_tx_url("Abc"),
            "https://testnet.suivision.xyz/txblock/Abc"
        );
    }

    #[test]
    fn test_network_parse() {
        assert_eq!("Devnet".parse::<SuiNetwork>().unwrap(), SuiNetwork::Devnet);
        assert!(matches!(
            "moonnet".parse::<SuiNetwork>(),
            Err(ConfigError::UnknownNetwork { .. })
        ));
    }

    #[test]
    fn test_move_target_parse() {
        let target = MoveTarget::parse("t", &ContractsConfig::default().dex_target).unwrap();
        assert_eq!(target.module, "dubhe_dex_system");
        assert_eq!(target.function, "swap_exact_tokens_for_tokens");

        assert!(MoveTarget::parse("t", "0x1::only_module").is_err());
        assert!(MoveTarget::parse("t", "abc::m::f").is_err());
        assert!(MoveTarget::parse("t", "0x1::m::1f").is_err());
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(MerakConfig::default().validate().is_ok());
    }
}
