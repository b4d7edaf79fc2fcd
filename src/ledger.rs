//! Append-only JSON ledger of minted positions.
//!
//! Appends read the current file (a missing file is an empty ledger),
//! push the new records after the existing ones and write the whole ledger
//! back through a temporary file. Nothing ever rewrites or drops an
//! existing entry.

use crate::error::LedgerError;
use crate::events::MintedPosition;
use crate::params::MintParameters;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::info;

/// One minted position. Every field is a decimal (or checksummed address)
/// string so large integers survive any JSON reader.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionRecord {
    pub token_id: String,
    pub token0: String,
    pub token1: String,
    pub fee: String,
    pub tick_lower: String,
    pub tick_upper: String,
    pub liquidity: String,
    pub amount0: String,
    pub amount1: String,
}

impl PositionRecord {
    /// Combines the submitted parameters with what the pool actually took.
    pub fn from_mint(params: &MintParameters, minted: &MintedPosition) -> Self {
        Self {
            token_id: minted.token_id.to_string(),
            token0: params.token0.to_checksum(None),
            token1: params.token1.to_checksum(None),
            fee: params.fee.to_string(),
            tick_lower: params.tick_lower.to_string(),
            tick_upper: params.tick_upper.to_string(),
            liquidity: minted.liquidity.to_string(),
            amount0: minted.amount0.to_string(),
            amount1: minted.amount1.to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionLedgerFile {
    pub positions: Vec<PositionRecord>,
}

#[derive(Clone, Debug)]
pub struct PositionLedger {
    path: PathBuf,
}

impl PositionLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current contents; a ledger that was never written is empty.
    pub fn load(&self) -> Result<PositionLedgerFile, LedgerError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Ok(PositionLedgerFile::default());
            }
            Err(source) => {
                return Err(LedgerError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        serde_json::from_str(&raw).map_err(|source| LedgerError::Malformed {
            path: self.path.clone(),
            source,
        })
    }

    /// Appends one record, returning the new number of entries.
    pub fn append(&self, record: PositionRecord) -> Result<usize, LedgerError> {
        self.append_all(std::iter::once(record))
    }

    /// Appends records in iteration order, returning the new number of
    /// entries.
    pub fn append_all(
        &self,
        records: impl IntoIterator<Item = PositionRecord>,
    ) -> Result<usize, LedgerError> {
        let mut ledger = self.load()?;
        let before = ledger.positions.len();
        ledger.positions.extend(records);

        self.write(&ledger)?;

        info!(
            path = %self.path.display(),
            appended = ledger.positions.len() - before,
            total = ledger.positions.len(),
            "position ledger updated"
        );
        Ok(ledger.positions.len())
    }

    fn write(&self, ledger: &PositionLedgerFile) -> Result<(), LedgerError> {
        let io_err = |source| LedgerError::Io {
            path: self.path.clone(),
            source,
        };

        let json = serde_json::to_string_pretty(ledger).map_err(|source| LedgerError::Malformed {
            path: self.path.clone(),
            source,
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)
    }
}
