//! Command-line driver for the periphery deployment, mint and swap
//! workflows.

use alloy::network::EthereumWallet;
use alloy::providers::{Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use clmm_orchestrator::chain::RpcChain;
use clmm_orchestrator::config::OrchestratorConfig;
use clmm_orchestrator::deploy::{ArtifactDeployer, deploy_position_manager, deploy_router};
use clmm_orchestrator::ledger::PositionLedger;
use clmm_orchestrator::params::RangeStrategy;
use clmm_orchestrator::workflow::{mint_target, swap_target};
use clmm_orchestrator::workflow::mint::{MintOutcome, MintWorkflow};
use clmm_orchestrator::workflow::swap::run_swap_pair;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "clmm-orchestrator")]
#[command(about = "Deploy periphery contracts, add liquidity and swap on a V3-style pool")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "orchestrator.toml")]
    config: PathBuf,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Deploy WETH9 (unless recorded) and the SwapRouter
    DeployRouter,
    /// Deploy the NFT descriptor, token descriptor and position manager
    DeployPositionManager,
    /// Mint a position in the recorded pool
    AddLiquidity {
        /// Override the configured range strategy
        #[arg(long, value_enum)]
        strategy: Option<RangeStrategy>,
    },
    /// Swap token0 -> token1 and back through the recorded pool
    Swap {
        /// Only run the token0 -> token1 swap
        #[arg(long)]
        no_reverse: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("clmm_orchestrator={log_level},warn").into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = OrchestratorConfig::from_file(&cli.config)?;
    match &cli.command {
        Command::AddLiquidity {
            strategy: Some(strategy),
        } => config.mint.strategy = *strategy,
        Command::Swap { no_reverse: true } => config.swap.reverse = false,
        _ => {}
    }
    config.validate()?;

    info!(network = %config.network_name, rpc_url = %config.rpc_url, "starting");

    match cli.command {
        Command::DeployRouter => {
            let chain = connect(&config)?;
            let mut deployer = ArtifactDeployer::from_config(&chain, &config)?;
            let record = deploy_router(&mut deployer, &config).await?;
            info!(swap_router = %record.swap_router, weth9 = %record.weth9, "router deployed");
            Ok(ExitCode::SUCCESS)
        }
        Command::DeployPositionManager => {
            let chain = connect(&config)?;
            let mut deployer = ArtifactDeployer::from_config(&chain, &config)?;
            let record = deploy_position_manager(&mut deployer, &config).await?;
            info!(
                position_manager = ?record.position_manager,
                token_descriptor = ?record.token_descriptor,
                "position manager deployed"
            );
            Ok(ExitCode::SUCCESS)
        }
        Command::AddLiquidity { .. } => add_liquidity(&config).await,
        Command::Swap { .. } => swap(&config).await,
    }
}

async fn add_liquidity(config: &OrchestratorConfig) -> Result<ExitCode> {
    let (target, position_manager) = mint_target(&config.paths)?;
    let ledger = PositionLedger::new(&config.paths.position_ledger);

    let chain = connect(config)?;
    match MintWorkflow::new(&chain, config, target, position_manager, &ledger)
        .run()
        .await
    {
        Ok(MintOutcome::Recorded {
            record,
            range,
            ledger_len,
            tx_hash,
        }) => {
            info!(
                token_id = %record.token_id,
                %range,
                %tx_hash,
                positions = ledger_len,
                "liquidity added"
            );
            Ok(ExitCode::SUCCESS)
        }
        Ok(MintOutcome::EventNotFound { tx_hash }) => {
            warn!(%tx_hash, "mint confirmed but no position was recorded");
            Ok(ExitCode::SUCCESS)
        }
        Err(failed) if failed.is_fatal() => Err(failed.into()),
        Err(failed) => {
            error!(revert_data = ?failed.reason.revert_data(), "{failed}");
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn swap(config: &OrchestratorConfig) -> Result<ExitCode> {
    let (target, router) = swap_target(&config.paths)?;

    let chain = connect(config)?;
    let report = run_swap_pair(&chain, config, target, router).await;

    for result in std::iter::once(&report.forward).chain(report.reverse.as_ref()) {
        match result {
            Ok(outcome) => info!(
                direction = %outcome.direction,
                tx_hash = %outcome.tx_hash,
                spent = %outcome.delta.spent,
                received = %outcome.delta.received,
                "swap completed"
            ),
            Err(failed) => error!(revert_data = ?failed.reason.revert_data(), "{failed}"),
        }
    }

    Ok(if report.has_fatal() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Builds the signing provider. No request is made until a workflow reads
/// from the chain.
fn connect(config: &OrchestratorConfig) -> Result<RpcChain<impl Provider + Send + Sync + 'static>> {
    let key = std::env::var(&config.private_key_env)
        .with_context(|| format!("environment variable {} is not set", config.private_key_env))?;
    let signer: PrivateKeySigner = key.trim().parse().context("invalid signer private key")?;
    let address = signer.address();

    let url = config
        .rpc_url
        .parse()
        .with_context(|| format!("invalid rpc_url {}", config.rpc_url))?;
    let provider = ProviderBuilder::new()
        .wallet(EthereumWallet::from(signer))
        .connect_http(url);

    info!(signer = %address, "signer loaded");
    Ok(RpcChain::new(Arc::new(provider), address))
}
