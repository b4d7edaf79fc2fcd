//! Prior-stage JSON records: the core factory and pool deployments, the
//! WETH9 address, and the periphery deployment record this crate writes.

use crate::error::ConfigError;
use alloy_primitives::Address;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// `{ factory }`, written by the core deployment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactoryRecord {
    pub factory: String,
}

/// `{ weth9 }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weth9Record {
    pub weth9: String,
}

/// Periphery deployment record. The position manager stage adds the last
/// three fields to a record first written by the router stage.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_name: Option<String>,
    pub factory: String,
    pub weth9: String,
    pub swap_router: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nft_descriptor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_descriptor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_manager: Option<String>,
    /// Keys written by other tooling, carried through unchanged.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl DeploymentRecord {
    pub fn factory(&self) -> Result<Address, ConfigError> {
        parse_address("factory", &self.factory)
    }

    pub fn weth9(&self) -> Result<Address, ConfigError> {
        parse_address("weth9", &self.weth9)
    }

    pub fn swap_router(&self) -> Result<Address, ConfigError> {
        parse_address("swapRouter", &self.swap_router)
    }

    /// The position manager address; absent until that stage has run.
    pub fn position_manager(&self, path: &Path) -> Result<Address, ConfigError> {
        let value = self
            .position_manager
            .as_deref()
            .ok_or_else(|| ConfigError::Missing {
                record: "positionManager entry of the deployment record",
                path: path.to_path_buf(),
            })?;
        parse_address("positionManager", value)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenEntry {
    pub address: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolTokens {
    pub token0: TokenEntry,
    pub token1: TokenEntry,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolEntry {
    pub address: String,
    pub fee: u32,
}

/// `{ pool: { address, fee }, tokens: { token0: { address }, token1: { address } } }`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolRecord {
    pub pool: PoolEntry,
    pub tokens: PoolTokens,
}

impl PoolRecord {
    pub fn pool_address(&self) -> Result<Address, ConfigError> {
        parse_address("pool.address", &self.pool.address)
    }

    /// Token order as recorded; the pool's own order may differ.
    pub fn configured_tokens(&self) -> Result<(Address, Address), ConfigError> {
        Ok((
            parse_address("tokens.token0.address", &self.tokens.token0.address)?,
            parse_address("tokens.token1.address", &self.tokens.token1.address)?,
        ))
    }
}

pub fn parse_address(field: &'static str, value: &str) -> Result<Address, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidAddress {
        field,
        value: value.to_owned(),
    })
}

/// Loads a record that a previous stage must have produced.
pub fn load_required<T: DeserializeOwned>(
    record: &'static str,
    path: &Path,
) -> Result<T, ConfigError> {
    load_optional(path)?.ok_or_else(|| ConfigError::Missing {
        record,
        path: path.to_path_buf(),
    })
}

/// Loads a record if it exists.
pub fn load_optional<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, ConfigError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
}

/// Writes a record as pretty-printed JSON, creating parent directories.
pub fn save<T: Serialize>(path: &Path, record: &T) -> Result<(), ConfigError> {
    let io_err = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };

    let json = serde_json::to_string_pretty(record).map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(path, json).map_err(io_err)
}
