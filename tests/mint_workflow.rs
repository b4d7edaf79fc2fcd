mod common;

use alloy_primitives::{Address, U256};
use clmm_orchestrator::chain::ContractCall;
use clmm_orchestrator::config::OrchestratorConfig;
use clmm_orchestrator::error::{ConfigError, Error};
use clmm_orchestrator::gas::Operation;
use clmm_orchestrator::ledger::PositionLedger;
use clmm_orchestrator::params::{RangeKind, RangeStrategy, unix_now};
use clmm_orchestrator::records::{
    DeploymentRecord, PoolEntry, PoolRecord, PoolTokens, TokenEntry, save,
};
use clmm_orchestrator::workflow::{PoolTarget, mint_target};
use clmm_orchestrator::workflow::mint::{MintOutcome, MintState, MintWorkflow};
use common::*;

fn target() -> PoolTarget {
    PoolTarget::new(POOL, Some((TOKEN0, TOKEN1)))
}

#[tokio::test]
async fn mints_a_narrow_position_and_records_it() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let ledger = PositionLedger::new(&config.paths.position_ledger);
    let chain = FakeChain::new();

    let outcome = MintWorkflow::new(&chain, &config, target(), MANAGER, &ledger)
        .run()
        .await
        .unwrap();

    let MintOutcome::Recorded {
        record,
        range,
        ledger_len,
        ..
    } = outcome
    else {
        panic!("expected a recorded position, got {outcome:?}");
    };
    assert_eq!(range, RangeKind::Narrow);
    assert_eq!(ledger_len, 1);
    assert_eq!(record.token_id, "1");
    assert_eq!((record.tick_lower.as_str(), record.tick_upper.as_str()), ("0", "60"));
    assert_eq!(record.amount0, E16.to_string());
    assert_eq!(record.amount1, E16.to_string());

    assert_eq!(
        chain.operations(),
        [Operation::Approval, Operation::Approval, Operation::Mint]
    );
    let gas = chain.sent_gas();
    assert!(gas.iter().all(|settings| settings.gas_price == 120));
    assert_eq!(gas[0].gas_limit, 100_000);
    assert_eq!(gas[2].gas_limit, 1_000_000);

    let sent = chain.sent();
    let ContractCall::Mint { params, .. } = &sent[2] else {
        panic!("third call should be the mint");
    };
    assert!(params.tick_lower < params.tick_upper);
    assert!(params.deadline > unix_now());
    assert_eq!(params.recipient, SIGNER);

    assert_eq!(ledger.load().unwrap().positions, vec![record]);
}

#[tokio::test]
async fn empty_pool_gets_a_full_range_position() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let ledger = PositionLedger::new(&config.paths.position_ledger);
    let chain = FakeChain::new().with_liquidity(0);

    let outcome = MintWorkflow::new(&chain, &config, target(), MANAGER, &ledger)
        .run()
        .await
        .unwrap();

    let MintOutcome::Recorded { record, range, .. } = outcome else {
        panic!("expected a recorded position");
    };
    assert_eq!(range, RangeKind::FullRange);
    assert_eq!(record.tick_lower, "-887220");
    assert_eq!(record.tick_upper, "887220");
    assert_eq!(record.amount0, E17.to_string());
    assert_eq!(record.amount1, E17.to_string());
}

#[tokio::test]
async fn full_range_strategy_applies_to_a_live_pool() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.mint.strategy = RangeStrategy::FullRange;
    let ledger = PositionLedger::new(&config.paths.position_ledger);
    let chain = FakeChain::new();

    let outcome = MintWorkflow::new(&chain, &config, target(), MANAGER, &ledger)
        .run()
        .await
        .unwrap();
    assert!(matches!(
        outcome,
        MintOutcome::Recorded {
            range: RangeKind::FullRange,
            ..
        }
    ));
}

#[tokio::test]
async fn insufficient_balance_stops_before_any_approval() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let ledger = PositionLedger::new(&config.paths.position_ledger);
    let chain = FakeChain::new().with_balance(TOKEN1, U256::from(E16 - 1));

    let failed = MintWorkflow::new(&chain, &config, target(), MANAGER, &ledger)
        .run()
        .await
        .unwrap_err();

    assert_eq!(failed.state, MintState::ValidateBalances);
    assert!(failed.is_fatal());
    match failed.reason {
        Error::InsufficientBalance {
            token,
            required,
            available,
        } => {
            assert_eq!(token, TOKEN1);
            assert_eq!(required, U256::from(E16));
            assert_eq!(available, U256::from(E16 - 1));
        }
        other => panic!("expected InsufficientBalance, got {other:?}"),
    }
    assert!(chain.sent().is_empty());
    assert!(!config.paths.position_ledger.exists());
}

#[tokio::test]
async fn missing_event_persists_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let ledger = PositionLedger::new(&config.paths.position_ledger);
    let chain = FakeChain::new().without_mint_event();

    let outcome = MintWorkflow::new(&chain, &config, target(), MANAGER, &ledger)
        .run()
        .await
        .unwrap();

    assert!(matches!(outcome, MintOutcome::EventNotFound { .. }));
    assert!(!config.paths.position_ledger.exists());
}

#[tokio::test]
async fn reverted_mint_fails_without_touching_the_ledger() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let ledger = PositionLedger::new(&config.paths.position_ledger);
    ledger
        .append(clmm_orchestrator::ledger::PositionRecord {
            token_id: "9".into(),
            token0: TOKEN0.to_checksum(None),
            token1: TOKEN1.to_checksum(None),
            fee: "3000".into(),
            tick_lower: "0".into(),
            tick_upper: "60".into(),
            liquidity: "1".into(),
            amount0: "1".into(),
            amount1: "1".into(),
        })
        .unwrap();
    let before = std::fs::read_to_string(&config.paths.position_ledger).unwrap();
    let chain = FakeChain::new().reverting_on(Operation::Mint);

    let failed = MintWorkflow::new(&chain, &config, target(), MANAGER, &ledger)
        .run()
        .await
        .unwrap_err();

    assert_eq!(failed.state, MintState::AwaitConfirmation);
    assert!(matches!(
        failed.reason,
        Error::TransactionReverted {
            tx_hash: Some(_),
            ..
        }
    ));
    assert!(!failed.is_fatal());
    assert_eq!(
        std::fs::read_to_string(&config.paths.position_ledger).unwrap(),
        before
    );
}

#[tokio::test]
async fn rejected_approval_surfaces_revert_data() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let ledger = PositionLedger::new(&config.paths.position_ledger);
    let chain = FakeChain::new().rejecting(Operation::Approval);

    let failed = MintWorkflow::new(&chain, &config, target(), MANAGER, &ledger)
        .run()
        .await
        .unwrap_err();

    assert_eq!(failed.state, MintState::ApproveTokens);
    assert_eq!(
        failed.reason.revert_data().map(|data| data.to_vec()),
        Some(vec![0x08, 0xc3, 0x79, 0xa0])
    );
    assert!(chain.sent().is_empty());
}

#[tokio::test]
async fn configured_token_order_yields_to_the_pool() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let ledger = PositionLedger::new(&config.paths.position_ledger);
    let chain = FakeChain::new();
    let reversed = PoolTarget::new(POOL, Some((TOKEN1, TOKEN0)));

    let outcome = MintWorkflow::new(&chain, &config, reversed, MANAGER, &ledger)
        .run()
        .await
        .unwrap();

    let MintOutcome::Recorded { record, .. } = outcome else {
        panic!("expected a recorded position");
    };
    assert_eq!(record.token0, TOKEN0.to_checksum(None));
    assert_eq!(record.token1, TOKEN1.to_checksum(None));
}

#[tokio::test]
async fn successive_mints_append_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let ledger = PositionLedger::new(&config.paths.position_ledger);
    let chain = FakeChain::new();

    for _ in 0..2 {
        MintWorkflow::new(&chain, &config, target(), MANAGER, &ledger)
            .run()
            .await
            .unwrap();
    }

    let ids: Vec<_> = ledger
        .load()
        .unwrap()
        .positions
        .into_iter()
        .map(|record| record.token_id)
        .collect();
    assert_eq!(ids, ["1", "2"]);
}

async fn mint_from_records(
    chain: &FakeChain,
    config: &OrchestratorConfig,
) -> Result<MintOutcome, Error> {
    let (target, position_manager) = mint_target(&config.paths)?;
    let ledger = PositionLedger::new(&config.paths.position_ledger);
    MintWorkflow::new(chain, config, target, position_manager, &ledger)
        .run()
        .await
        .map_err(|failed| failed.reason)
}

fn pool_record() -> PoolRecord {
    PoolRecord {
        pool: PoolEntry {
            address: POOL.to_checksum(None),
            fee: 3000,
        },
        tokens: PoolTokens {
            token0: TokenEntry {
                address: TOKEN0.to_checksum(None),
            },
            token1: TokenEntry {
                address: TOKEN1.to_checksum(None),
            },
        },
    }
}

fn deployment_record(position_manager: Option<String>) -> DeploymentRecord {
    DeploymentRecord {
        factory: Address::repeat_byte(0x0f).to_checksum(None),
        weth9: Address::repeat_byte(0x0e).to_checksum(None),
        swap_router: ROUTER.to_checksum(None),
        position_manager,
        ..Default::default()
    }
}

#[tokio::test]
async fn missing_records_fail_before_any_remote_call() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let chain = FakeChain::new();

    let err = mint_from_records(&chain, &config).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Config(ConfigError::Missing { record: "deployment record", .. })
    ));
    assert!(err.is_fatal());

    // router stage ran, position manager stage did not
    save(&config.paths.deployment_record, &deployment_record(None)).unwrap();
    let err = mint_from_records(&chain, &config).await.unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::Missing { .. })));

    save(
        &config.paths.deployment_record,
        &deployment_record(Some(MANAGER.to_checksum(None))),
    )
    .unwrap();
    let err = mint_from_records(&chain, &config).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Config(ConfigError::Missing { record: "pool record", .. })
    ));

    assert_eq!(chain.reads(), 0);
    assert!(chain.sent().is_empty());
    assert!(!config.paths.position_ledger.exists());
}

#[tokio::test]
async fn mints_through_the_recorded_position_manager() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    save(
        &config.paths.deployment_record,
        &deployment_record(Some(MANAGER.to_checksum(None))),
    )
    .unwrap();
    save(&config.paths.pool_record, &pool_record()).unwrap();
    let chain = FakeChain::new();

    let outcome = mint_from_records(&chain, &config).await.unwrap();

    assert!(matches!(outcome, MintOutcome::Recorded { ledger_len: 1, .. }));
    let sent = chain.sent();
    let ContractCall::Approve { spender, .. } = &sent[0] else {
        panic!("first call should approve the position manager");
    };
    assert_eq!(*spender, MANAGER);
}
