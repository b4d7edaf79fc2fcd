//! Orchestrator configuration, loaded once from TOML and passed by
//! reference into every workflow.

use crate::error::ConfigError;
use crate::gas::{GasLimits, GasPolicy};
use crate::params::{MintSizing, RangeStrategy};
use alloy_primitives::U256;
use alloy_primitives::utils::parse_units;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Name written into the deployment record.
    pub network_name: String,
    pub rpc_url: String,
    /// Environment variable holding the signer's hex private key. The key
    /// itself never lives in the file.
    pub private_key_env: String,
    /// Upper bound on waiting for a single receipt.
    pub confirmation_timeout_secs: u64,
    /// Mint and swap deadlines are this far past submission time.
    pub deadline_window_secs: u64,
    pub paths: PathsConfig,
    pub gas: GasConfig,
    pub mint: MintConfig,
    pub swap: SwapConfig,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            network_name: "localhost".into(),
            rpc_url: "http://127.0.0.1:8545".into(),
            private_key_env: "PRIVATE_KEY".into(),
            confirmation_timeout_secs: 300,
            deadline_window_secs: 20 * 60,
            paths: PathsConfig::default(),
            gas: GasConfig::default(),
            mint: MintConfig::default(),
            swap: SwapConfig::default(),
        }
    }
}

/// Record locations. The position ledger path is used for both reading and
/// writing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub factory_record: PathBuf,
    pub weth9_record: PathBuf,
    pub pool_record: PathBuf,
    pub deployment_record: PathBuf,
    pub position_ledger: PathBuf,
    /// Root of the compiled contract artifacts, one `<Name>.json` each.
    pub artifacts_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            factory_record: "deployments/deployed-factory.json".into(),
            weth9_record: "deployments/deployed-weth9.json".into(),
            pool_record: "deployments/deployed-pool.json".into(),
            deployment_record: "deployments/deployed-periphery.json".into(),
            position_ledger: "deployments/deployed-positions.json".into(),
            artifacts_dir: "artifacts".into(),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GasConfig {
    pub escalation_numerator: u128,
    pub escalation_denominator: u128,
    pub limits: GasLimits,
}

impl Default for GasConfig {
    fn default() -> Self {
        Self {
            escalation_numerator: 12,
            escalation_denominator: 10,
            limits: GasLimits::default(),
        }
    }
}

/// Amounts are human-readable token units, scaled by `token_decimals`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MintConfig {
    pub strategy: RangeStrategy,
    pub token_decimals: u8,
    pub narrow_base_amount: String,
    pub full_range_amount: String,
}

impl Default for MintConfig {
    fn default() -> Self {
        Self {
            strategy: RangeStrategy::Auto,
            token_decimals: 18,
            narrow_base_amount: "0.01".into(),
            full_range_amount: "0.1".into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwapConfig {
    pub amount_in: String,
    /// Also swap token1 -> token0 after the forward swap.
    pub reverse: bool,
}

impl Default for SwapConfig {
    fn default() -> Self {
        Self {
            amount_in: "0.01".into(),
            reverse: true,
        }
    }
}

impl OrchestratorConfig {
    /// Loads and validates `path`. A missing file yields the defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config = match fs::read_to_string(path) {
            Ok(raw) => toml::from_str(&raw).map_err(|source| ConfigError::Toml {
                path: path.to_path_buf(),
                source,
            })?,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "no config file, using defaults");
                Self::default()
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rpc_url.trim().is_empty() {
            return Err(ConfigError::Invalid("rpc_url must not be empty".into()));
        }
        if self.private_key_env.trim().is_empty() {
            return Err(ConfigError::Invalid("private_key_env must not be empty".into()));
        }
        if self.confirmation_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "confirmation_timeout_secs must be greater than 0".into(),
            ));
        }
        if self.deadline_window_secs == 0 {
            return Err(ConfigError::Invalid(
                "deadline_window_secs must be greater than 0".into(),
            ));
        }
        if self.gas.escalation_denominator == 0 {
            return Err(ConfigError::Invalid(
                "gas.escalation_denominator must be greater than 0".into(),
            ));
        }
        if self.gas.escalation_numerator < self.gas.escalation_denominator {
            return Err(ConfigError::Invalid(
                "gas escalation must not lower the network gas price".into(),
            ));
        }

        // amounts must parse at the configured precision
        self.mint_sizing()?;
        let amount_in = self.swap_amount()?;
        if amount_in.is_zero() {
            return Err(ConfigError::InvalidAmount {
                field: "swap.amount_in",
                value: self.swap.amount_in.clone(),
            });
        }

        Ok(())
    }

    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.confirmation_timeout_secs)
    }

    pub fn deadline_window(&self) -> Duration {
        Duration::from_secs(self.deadline_window_secs)
    }

    pub fn gas_policy(&self) -> Result<GasPolicy, ConfigError> {
        GasPolicy::new(
            self.gas.escalation_numerator,
            self.gas.escalation_denominator,
            self.gas.limits,
        )
        .map_err(|err| ConfigError::Invalid(err.to_string()))
    }

    pub fn mint_sizing(&self) -> Result<MintSizing, ConfigError> {
        let decimals = self.mint.token_decimals;
        Ok(MintSizing {
            strategy: self.mint.strategy,
            decimals,
            narrow_base_amount: to_base_units(
                "mint.narrow_base_amount",
                &self.mint.narrow_base_amount,
                decimals,
            )?,
            full_range_amount: to_base_units(
                "mint.full_range_amount",
                &self.mint.full_range_amount,
                decimals,
            )?,
        })
    }

    pub fn swap_amount(&self) -> Result<U256, ConfigError> {
        to_base_units("swap.amount_in", &self.swap.amount_in, self.mint.token_decimals)
    }
}

/// `"0.01"` at 18 decimals -> `10^16`.
fn to_base_units(field: &'static str, value: &str, decimals: u8) -> Result<U256, ConfigError> {
    parse_units(value, decimals)
        .map(|parsed| parsed.get_absolute())
        .map_err(|_| ConfigError::InvalidAmount {
            field,
            value: value.to_owned(),
        })
}
