//! Transfer hooks that call back into the pool mid-settlement

mod common;

use async_trait::async_trait;
use common::*;
use lendbank_lending::{LendingError, LendingPool, LendingResult};
use lendbank_transport::{Movement, TransferHook, TransportError, TransportResult};
use std::sync::{Arc, Mutex, OnceLock, Weak};
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
enum Attack {
    BorrowMore,
    Liquidate,
    Pause,
}

/// Calls back into the pool during every settlement and records what happened
struct ReentrantHook {
    pool: OnceLock<Weak<LendingPool>>,
    attack: Attack,
    attempts: Mutex<Vec<LendingResult<()>>>,
    observed_debt: Mutex<Vec<u128>>,
}

impl ReentrantHook {
    fn new(attack: Attack) -> Arc<Self> {
        Arc::new(Self {
            pool: OnceLock::new(),
            attack,
            attempts: Mutex::new(Vec::new()),
            observed_debt: Mutex::new(Vec::new()),
        })
    }

    fn attempts(&self) -> Vec<LendingResult<()>> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TransferHook for ReentrantHook {
    fn name(&self) -> &str {
        "reentrant"
    }

    async fn before_settle(&self, _movements: &[Movement]) -> TransportResult<()> {
        let Some(pool) = self.pool.get().and_then(Weak::upgrade) else {
            return Ok(());
        };

        let result = match self.attack {
            Attack::BorrowMore => pool.borrow_more(&alice(), 0, WAD).await.map(|_| ()),
            Attack::Liquidate => pool
                .liquidate(&bob(), &alice(), 0, 100 * WAD)
                .await
                .map(|_| ()),
            Attack::Pause => pool.set_paused(&admin(), true),
        };
        self.attempts.lock().unwrap().push(result);

        if let Ok(health) = pool.position_health(&alice(), 0).await {
            self.observed_debt.lock().unwrap().push(health.total_debt);
        }
        Ok(())
    }
}

/// Rejects every settlement from inside the callback
struct AbortingHook;

#[async_trait]
impl TransferHook for AbortingHook {
    fn name(&self) -> &str {
        "aborting"
    }

    async fn before_settle(&self, _movements: &[Movement]) -> TransportResult<()> {
        Err(TransportError::HookAborted("receiver reverted".to_string()))
    }
}

/// Stalls every settlement far longer than any caller waits
struct StallingHook;

#[async_trait]
impl TransferHook for StallingHook {
    fn name(&self) -> &str {
        "stalling"
    }

    async fn before_settle(&self, _movements: &[Movement]) -> TransportResult<()> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(())
    }
}

fn install(sb: &Sandbox, attack: Attack) -> Arc<ReentrantHook> {
    let hook = ReentrantHook::new(attack);
    hook.pool.set(Arc::downgrade(&sb.pool)).unwrap();
    sb.bank.set_hook(hook.clone());
    hook
}

#[tokio::test]
async fn test_reentrant_borrow_is_rejected() {
    let sb = sandbox().await;
    sb.pool
        .open_position(&alice(), &tok(), 100 * WAD, 5 * WAD)
        .await
        .unwrap();
    let hook = install(&sb, Attack::BorrowMore);

    sb.pool.borrow_more(&alice(), 0, WAD).await.unwrap();

    assert_eq!(hook.attempts(), vec![Err(LendingError::Reentrancy)]);
    // The callback already saw the finalized debt
    assert_eq!(*hook.observed_debt.lock().unwrap(), vec![6 * WAD]);

    assert_eq!(sb.position(&alice(), 0).debt, 6 * WAD);
    assert_eq!(sb.native(&alice()), 6 * WAD);
    assert_eq!(sb.pool.stats().ledger.total_borrowed, 6 * WAD);
}

#[tokio::test]
async fn test_reentrant_liquidation_during_repay_is_rejected() {
    let sb = sandbox().await;
    sb.pool
        .open_position(&alice(), &tok(), 100 * WAD, 5 * WAD)
        .await
        .unwrap();
    let hook = install(&sb, Attack::Liquidate);

    sb.pool.repay(&alice(), 0, 5 * WAD).await.unwrap();

    assert_eq!(hook.attempts(), vec![Err(LendingError::Reentrancy)]);
    // Position was already zeroed when the callback ran
    assert_eq!(*hook.observed_debt.lock().unwrap(), vec![0]);
    assert_eq!(sb.tokens(&alice()), 1_000 * WAD);
    assert_eq!(sb.tokens(&bob()), 0);
}

#[tokio::test]
async fn test_reentrant_admin_call_is_rejected() {
    let sb = sandbox().await;
    let hook = install(&sb, Attack::Pause);

    sb.pool
        .open_position(&alice(), &tok(), 100 * WAD, 0)
        .await
        .unwrap();

    assert_eq!(hook.attempts(), vec![Err(LendingError::Reentrancy)]);
    assert!(!sb.pool.is_paused());
}

#[tokio::test]
async fn test_guard_released_after_callback() {
    let sb = sandbox().await;
    sb.pool
        .open_position(&alice(), &tok(), 100 * WAD, 5 * WAD)
        .await
        .unwrap();
    let hook = install(&sb, Attack::BorrowMore);
    sb.pool.borrow_more(&alice(), 0, WAD).await.unwrap();

    sb.bank.clear_hook();
    sb.pool.borrow_more(&alice(), 0, WAD).await.unwrap();

    assert_eq!(hook.attempts().len(), 1);
    assert_eq!(sb.position(&alice(), 0).debt, 7 * WAD);
}

#[tokio::test]
async fn test_aborted_settlement_rolls_back() {
    let sb = sandbox().await;
    sb.pool
        .open_position(&alice(), &tok(), 100 * WAD, 5 * WAD)
        .await
        .unwrap();
    let before = sb.pool.snapshot();

    sb.bank.set_hook(Arc::new(AbortingHook));

    // A lone payout maps to PayoutFailed
    let result = sb.pool.borrow_more(&alice(), 0, WAD).await;
    assert!(matches!(result, Err(LendingError::PayoutFailed(_))));

    // A collateral pull maps to TransferFailed
    let result = sb.pool.open_position(&alice(), &tok(), 10 * WAD, 0).await;
    assert!(matches!(result, Err(LendingError::TransferFailed(_))));

    assert_eq!(sb.pool.snapshot(), before);

    sb.bank.clear_hook();
    assert!(sb.pool.borrow_more(&alice(), 0, WAD).await.is_ok());
}

#[tokio::test]
async fn test_cancelled_borrow_rolls_back() {
    let sb = sandbox().await;
    sb.pool
        .open_position(&alice(), &tok(), 100 * WAD, 5 * WAD)
        .await
        .unwrap();
    let before = sb.pool.snapshot();

    sb.bank.set_hook(Arc::new(StallingHook));
    let result = tokio::time::timeout(
        Duration::from_millis(20),
        sb.pool.borrow_more(&alice(), 0, WAD),
    )
    .await;
    assert!(result.is_err());

    assert_eq!(sb.pool.snapshot(), before);
    assert_eq!(sb.position(&alice(), 0).debt, 5 * WAD);
    assert_eq!(sb.pool.stats().available_liquidity, 995 * WAD);
    assert_eq!(sb.pool.stats().ledger.total_borrowed, 5 * WAD);
    assert_eq!(sb.native(&alice()), 5 * WAD);

    // Guard released; the same borrow goes through once settlement is prompt
    sb.bank.clear_hook();
    let receipt = sb.pool.borrow_more(&alice(), 0, WAD).await.unwrap();
    assert_eq!(receipt.debt, 6 * WAD);
}

#[tokio::test]
async fn test_cancelled_open_discards_slot() {
    let sb = sandbox().await;
    sb.bank.set_hook(Arc::new(StallingHook));

    let result = tokio::time::timeout(
        Duration::from_millis(20),
        sb.pool.open_position(&alice(), &tok(), 100 * WAD, WAD),
    )
    .await;
    assert!(result.is_err());

    assert_eq!(sb.pool.position_count(&alice()), 0);
    assert_eq!(sb.pool.stats().available_liquidity, 1_000 * WAD);
    assert_eq!(sb.tokens(&alice()), 1_000 * WAD);
}

#[tokio::test]
async fn test_cancelled_repay_keeps_position_open() {
    let sb = sandbox().await;
    sb.pool
        .open_position(&alice(), &tok(), 100 * WAD, 5 * WAD)
        .await
        .unwrap();
    let before = sb.pool.snapshot();

    sb.bank.set_hook(Arc::new(StallingHook));
    let result = tokio::time::timeout(
        Duration::from_millis(20),
        sb.pool.repay(&alice(), 0, 5 * WAD),
    )
    .await;
    assert!(result.is_err());

    assert_eq!(sb.pool.snapshot(), before);
    assert!(!sb.position(&alice(), 0).is_closed());

    sb.bank.clear_hook();
    assert!(sb.pool.repay(&alice(), 0, 5 * WAD).await.is_ok());
}
