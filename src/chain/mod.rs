//! The remote ledger as seen by the workflows.
//!
//! [`Chain`] is the only seam through which the crate touches the network:
//! pool and token reads, the gas price, and sending/confirming transactions
//! from the single configured signer. [`RpcChain`] implements it over an
//! alloy provider.

pub mod contracts;
mod rpc;

pub use rpc::{OnchainProvider, RpcChain};

use crate::error::{MathError, OnchainError};
use crate::gas::Operation;
use crate::params::{MintParameters, SwapParameters};
use crate::pool::state::Slot0;
use alloy::sol_types::SolCall;
use alloy_primitives::{Address, B256, Bytes, Log, U256};
use async_trait::async_trait;
use contracts::{IERC20, INonfungiblePositionManager, ISwapRouter};

/// A state-changing call issued by the signer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContractCall {
    Approve {
        token: Address,
        spender: Address,
        amount: U256,
    },
    Mint {
        position_manager: Address,
        params: MintParameters,
    },
    ExactInputSingle {
        router: Address,
        params: SwapParameters,
    },
    /// Contract creation; `init_code` is linked bytecode followed by the
    /// ABI-encoded constructor arguments.
    Deploy { contract: String, init_code: Bytes },
}

impl ContractCall {
    pub fn operation(&self) -> Operation {
        match self {
            ContractCall::Approve { .. } => Operation::Approval,
            ContractCall::Mint { .. } => Operation::Mint,
            ContractCall::ExactInputSingle { .. } => Operation::Swap,
            ContractCall::Deploy { .. } => Operation::Deploy,
        }
    }

    /// Destination address; `None` for contract creation.
    pub fn target(&self) -> Option<Address> {
        match self {
            ContractCall::Approve { token, .. } => Some(*token),
            ContractCall::Mint {
                position_manager, ..
            } => Some(*position_manager),
            ContractCall::ExactInputSingle { router, .. } => Some(*router),
            ContractCall::Deploy { .. } => None,
        }
    }

    pub fn deadline(&self) -> Option<u64> {
        match self {
            ContractCall::Mint { params, .. } => Some(params.deadline),
            ContractCall::ExactInputSingle { params, .. } => Some(params.deadline),
            _ => None,
        }
    }

    /// ABI-encoded transaction input.
    pub fn input(&self) -> Result<Bytes, MathError> {
        let input = match self {
            ContractCall::Approve {
                spender, amount, ..
            } => IERC20::approveCall {
                spender: *spender,
                amount: *amount,
            }
            .abi_encode(),
            ContractCall::Mint { params, .. } => INonfungiblePositionManager::mintCall {
                params: params.try_into()?,
            }
            .abi_encode(),
            ContractCall::ExactInputSingle { params, .. } => ISwapRouter::exactInputSingleCall {
                params: params.into(),
            }
            .abi_encode(),
            ContractCall::Deploy { init_code, .. } => return Ok(init_code.clone()),
        };
        Ok(input.into())
    }
}

/// Gas fields attached to a legacy transaction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GasSettings {
    pub gas_price: u128,
    pub gas_limit: u64,
}

/// The parts of a confirmed receipt the workflows consume.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_hash: B256,
    pub block_number: Option<u64>,
    pub success: bool,
    pub contract_address: Option<Address>,
    pub logs: Vec<Log>,
}

#[async_trait]
pub trait Chain: Send + Sync {
    /// Handle to a sent, not yet confirmed transaction.
    type Pending: Send;

    /// Address every transaction is sent from.
    fn signer(&self) -> Address;

    async fn token0(&self, pool: Address) -> Result<Address, OnchainError>;

    async fn token1(&self, pool: Address) -> Result<Address, OnchainError>;

    async fn fee(&self, pool: Address) -> Result<u32, OnchainError>;

    async fn tick_spacing(&self, pool: Address) -> Result<i32, OnchainError>;

    async fn slot0(&self, pool: Address) -> Result<Slot0, OnchainError>;

    async fn liquidity(&self, pool: Address) -> Result<u128, OnchainError>;

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256, OnchainError>;

    async fn gas_price(&self) -> Result<u128, OnchainError>;

    async fn send(
        &self,
        call: &ContractCall,
        gas: GasSettings,
    ) -> Result<Self::Pending, OnchainError>;

    fn pending_hash(pending: &Self::Pending) -> B256;

    /// Waits until the transaction is included and returns its receipt.
    async fn confirm(&self, pending: Self::Pending) -> Result<TxReceipt, OnchainError>;
}
