//! Mint and swap workflows.
//!
//! Each workflow is a linear state sequence. A failure stops the sequence
//! and reports the state it happened in together with the reason; nothing
//! already confirmed on-chain is rolled back.

pub mod mint;
pub mod swap;

use crate::chain::Chain;
use crate::config::PathsConfig;
use crate::error::{ConfigError, Error};
use crate::pool::state::{PoolState, PoolStateReader};
use crate::records::{DeploymentRecord, PoolRecord, load_required};
use alloy_primitives::Address;
use std::fmt;
use tracing::warn;

/// The pool a workflow acts on, plus whatever the pool record claims about
/// it. The pool's own answers win over these expectations.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PoolTarget {
    pub pool: Address,
    pub expected_tokens: Option<(Address, Address)>,
    pub expected_fee: Option<u32>,
}

impl PoolTarget {
    pub fn new(pool: Address, expected_tokens: Option<(Address, Address)>) -> Self {
        Self {
            pool,
            expected_tokens,
            expected_fee: None,
        }
    }

    pub fn from_record(record: &PoolRecord) -> Result<Self, ConfigError> {
        Ok(Self {
            pool: record.pool_address()?,
            expected_tokens: Some(record.configured_tokens()?),
            expected_fee: Some(record.pool.fee),
        })
    }

    /// Fresh snapshot of the pool; configuration disagreements are logged.
    pub async fn read<C: Chain>(&self, chain: &C) -> Result<PoolState, Error> {
        let snapshot = PoolStateReader::new(chain)
            .read_checked(self.pool, self.expected_tokens)
            .await?;

        if let Some(configured) = self.expected_fee.filter(|fee| *fee != snapshot.state.fee) {
            warn!(
                configured_fee = configured,
                pool_fee = snapshot.state.fee,
                "fee mismatch between pool and config, using the pool fee"
            );
        }

        Ok(snapshot.state)
    }
}

/// The recorded pool and position manager a mint acts on. Only the record
/// files are read.
pub fn mint_target(paths: &PathsConfig) -> Result<(PoolTarget, Address), ConfigError> {
    let deployment: DeploymentRecord =
        load_required("deployment record", &paths.deployment_record)?;
    let position_manager = deployment.position_manager(&paths.deployment_record)?;
    Ok((recorded_pool(paths)?, position_manager))
}

/// The recorded pool and swap router a swap goes through.
pub fn swap_target(paths: &PathsConfig) -> Result<(PoolTarget, Address), ConfigError> {
    let deployment: DeploymentRecord =
        load_required("deployment record", &paths.deployment_record)?;
    let router = deployment.swap_router()?;
    Ok((recorded_pool(paths)?, router))
}

fn recorded_pool(paths: &PathsConfig) -> Result<PoolTarget, ConfigError> {
    let record: PoolRecord = load_required("pool record", &paths.pool_record)?;
    PoolTarget::from_record(&record)
}

/// A workflow stopped in `state` because of `reason`.
#[derive(Debug)]
pub struct Failed<S> {
    pub state: S,
    pub reason: Error,
}

impl<S> Failed<S> {
    pub fn is_fatal(&self) -> bool {
        self.reason.is_fatal()
    }
}

impl<S: fmt::Display> fmt::Display for Failed<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed during {}: {}", self.state, self.reason)
    }
}

impl<S: fmt::Debug + fmt::Display> std::error::Error for Failed<S> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.reason)
    }
}
