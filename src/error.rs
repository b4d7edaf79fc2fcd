use alloy_primitives::{Address, B256, Bytes, U256};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MathError {
    #[error("Math error - overflow")]
    Overflow,
    #[error("Math error - division by zero")]
    DivisionByZero,
    #[error("Math error - tick spacing must be positive, got {0}")]
    InvalidTickSpacing(i32),
    #[error("Math error - no canonical tick spacing for fee tier {0}")]
    UnsupportedFeeTier(u32),
    #[error("Math error - tick {0} out of bounds")]
    TickOutOfBounds(i32),
    #[error("Math error - invalid tick range [{lower}, {upper}] for spacing {spacing}")]
    InvalidRange { lower: i32, upper: i32, spacing: i32 },
    #[error("Math error - token decimals {0} exceed the supported precision")]
    UnsupportedDecimals(u8),
}

#[derive(Debug, Error)]
pub enum StateError {
    #[error("State error - pool {0} is not initialized (sqrtPrice is 0)")]
    PoolNotInitialized(Address),
    #[error("State error - sqrtPrice out of bounds")]
    SqrtPriceOutOfBounds,
    #[error("State error - tick spacing {0} reported by the pool is not positive")]
    InvalidTickSpacing(i32),
}

#[derive(Debug, Error)]
pub enum OnchainError {
    #[error("Onchain error - failed to get token0: {0}")]
    FailedToGetToken0(String),
    #[error("Onchain error - failed to get token1: {0}")]
    FailedToGetToken1(String),
    #[error("Onchain error - failed to get fee: {0}")]
    FailedToGetFee(String),
    #[error("Onchain error - failed to get tick spacing: {0}")]
    FailedToGetTickSpacing(String),
    #[error("Onchain error - failed to get slot0: {0}")]
    FailedToGetSlot0(String),
    #[error("Onchain error - failed to get liquidity: {0}")]
    FailedToGetLiquidity(String),
    #[error("Onchain error - failed to get balance of {token}: {reason}")]
    FailedToGetBalance { token: Address, reason: String },
    #[error("Onchain error - failed to get gas price: {0}")]
    FailedToGetGasPrice(String),
    #[error("Onchain error - failed to send transaction: {reason}")]
    FailedToSendTransaction {
        reason: String,
        revert_data: Option<Bytes>,
    },
    #[error("Onchain error - failed to get receipt for {tx_hash}: {reason}")]
    FailedToGetReceipt { tx_hash: B256, reason: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{record} not found at {}", .path.display())]
    Missing { record: &'static str, path: PathBuf },
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to parse config {}: {source}", .path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("{field} is not a valid address: {value}")]
    InvalidAddress { field: &'static str, value: String },
    #[error("{field} is not a valid amount: {value}")]
    InvalidAmount { field: &'static str, value: String },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("failed to access position ledger {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("position ledger {} is malformed: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum DeployError {
    #[error("artifact for {contract} not found at {}", .path.display())]
    ArtifactMissing { contract: String, path: PathBuf },
    #[error("artifact for {contract} is malformed: {reason}")]
    MalformedArtifact { contract: String, reason: String },
    #[error("{contract} links {library} but no address was supplied")]
    UnlinkedLibrary { contract: String, library: String },
    #[error("deployment of {contract} confirmed without a contract address")]
    NoContractAddress { contract: String },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Math(#[from] MathError),

    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Onchain(#[from] OnchainError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Deploy(#[from] DeployError),

    #[error("insufficient balance of {token}: required {required}, available {available}")]
    InsufficientBalance {
        token: Address,
        required: U256,
        available: U256,
    },

    #[error("pool {pool} has no liquidity")]
    LiquidityAbsent { pool: Address },

    #[error("transaction reverted: {reason}")]
    TransactionReverted {
        tx_hash: Option<B256>,
        reason: String,
        revert_data: Option<Bytes>,
    },

    #[error("transaction {tx_hash} not confirmed within {timeout_secs}s")]
    ConfirmationTimeout { tx_hash: B256, timeout_secs: u64 },

    #[error("deadline {deadline} is not in the future (now {now})")]
    DeadlineExpired { deadline: u64, now: u64 },
}

impl Error {
    /// Whether this error must terminate the process.
    ///
    /// Submission-side failures only fail the current workflow step; every
    /// other kind is raised before anything irreversible happens and aborts.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Error::TransactionReverted { .. }
                | Error::ConfirmationTimeout { .. }
                | Error::DeadlineExpired { .. }
        )
    }

    pub fn revert_data(&self) -> Option<&Bytes> {
        match self {
            Error::TransactionReverted { revert_data, .. } => revert_data.as_ref(),
            _ => None,
        }
    }
}
