//! Lending pool - the ledger instance and its administrative surface
//!
//! Every mutating entry point follows the same shape:
//!
//! ```text
//! enter guard ──► read inputs ──► await oracle ──► lock state
//!                                                    │ checks
//!                                                    │ effects + checkpoint
//!                                                  unlock
//!                                                    │
//!                                   await transport.settle(movements)
//!                                                    │
//!                                   failed? lock state, roll back checkpoint
//! ```
//!
//! The state mutex is never held across an await; the guard is held for the
//! whole operation, so a callback from the transport cannot start a second
//! mutating operation on the same pool.

use lendbank_core::{AccountId, AssetId};
use lendbank_oracle::PriceOracle;
use lendbank_transport::{AssetTransport, Movement, TransportError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::clock::{Clock, SystemClock};
use crate::config::LendingConfig;
use crate::error::{LendingError, LendingResult};
use crate::guard::ReentrancyGuard;
use crate::health::PositionHealth;
use crate::interest::InterestModel;
use crate::math::{add, mul_div, BPS_DENOMINATOR};
use crate::position::{Position, PositionId};
use crate::registry::CollateralConfig;
use crate::state::{Checkpoint, PoolState, PoolStats, SlotCheckpoint};

/// A collateralized lending pool over one base currency
pub struct LendingPool {
    pub(crate) state: Mutex<PoolState>,
    pub(crate) guard: ReentrancyGuard,
    pub(crate) interest: InterestModel,
    config: LendingConfig,
    oracle: Arc<dyn PriceOracle>,
    transport: Arc<dyn AssetTransport>,
    pub(crate) clock: Arc<dyn Clock>,
}

impl LendingPool {
    /// Create an empty pool administered by `owner`
    pub fn new(
        owner: AccountId,
        config: LendingConfig,
        oracle: Arc<dyn PriceOracle>,
        transport: Arc<dyn AssetTransport>,
    ) -> Self {
        Self::from_state(PoolState::new(owner), config, oracle, transport)
    }

    /// Resume a pool from persisted state
    pub fn from_state(
        state: PoolState,
        config: LendingConfig,
        oracle: Arc<dyn PriceOracle>,
        transport: Arc<dyn AssetTransport>,
    ) -> Self {
        if config.liquidation_bonus_bps != 0 {
            tracing::warn!(
                liquidation_bonus_bps = config.liquidation_bonus_bps,
                "Liquidation bonus is configured but not applied: liquidators receive all collateral"
            );
        }

        Self {
            state: Mutex::new(state),
            guard: ReentrancyGuard::new(),
            interest: InterestModel::with_rate(config.annual_rate_bps),
            config,
            oracle,
            transport,
            clock: Arc::new(SystemClock),
        }
    }

    /// Use a different time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &LendingConfig {
        &self.config
    }

    /// Copy of the full state, for persistence
    pub fn snapshot(&self) -> PoolState {
        self.lock().clone()
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // === Administrative surface ===

    /// Add or update a collateral asset
    pub fn configure_collateral(
        &self,
        caller: &AccountId,
        asset: AssetId,
        decimals: u8,
        max_ltv_bps: u16,
        liquidation_bps: u16,
    ) -> LendingResult<CollateralConfig> {
        let _token = self.guard.enter()?;
        let mut state = self.lock();
        state.ownership.ensure(caller)?;

        let config = state
            .registry
            .configure(asset.clone(), decimals, max_ltv_bps, liquidation_bps)
            .inspect_err(|e| tracing::warn!(asset = %asset, error = %e, "Collateral configuration rejected"))?;

        tracing::info!(
            asset = %asset,
            decimals,
            max_ltv_bps,
            liquidation_bps,
            "Collateral configured"
        );
        Ok(config)
    }

    /// Block new positions against `asset`; existing positions are unaffected
    pub fn deactivate_collateral(&self, caller: &AccountId, asset: &AssetId) -> LendingResult<()> {
        let _token = self.guard.enter()?;
        let mut state = self.lock();
        state
            .ownership
            .ensure(caller)
            .and_then(|()| state.registry.deactivate(asset))
            .inspect_err(|e| tracing::warn!(asset = %asset, error = %e, "Deactivation rejected"))?;

        tracing::info!(asset = %asset, "Collateral deactivated");
        Ok(())
    }

    /// Pause or resume new borrowing
    pub fn set_paused(&self, caller: &AccountId, paused: bool) -> LendingResult<()> {
        let _token = self.guard.enter()?;
        let mut state = self.lock();
        state
            .ownership
            .ensure(caller)
            .inspect_err(|e| tracing::warn!(paused, error = %e, "Pause update rejected"))?;
        state.paused = paused;

        tracing::info!(paused, "Pause flag updated");
        Ok(())
    }

    /// Hand administrative control to `new_owner`
    pub fn transfer_ownership(&self, caller: &AccountId, new_owner: AccountId) -> LendingResult<()> {
        let _token = self.guard.enter()?;
        let mut state = self.lock();
        let previous = state
            .ownership
            .transfer(caller, new_owner.clone())
            .inspect_err(|e| tracing::warn!(caller = %caller, error = %e, "Ownership transfer rejected"))?;

        tracing::info!(previous = %previous, owner = %new_owner, "Ownership transferred");
        Ok(())
    }

    /// Add base currency to the pool's lendable liquidity
    pub async fn seed_liquidity(&self, caller: &AccountId, amount: u128) -> LendingResult<u128> {
        let _token = self.guard.enter()?;

        let checkpoint = {
            let mut state = self.lock();
            state
                .ownership
                .ensure(caller)
                .and_then(|()| {
                    if amount == 0 {
                        return Err(LendingError::ZeroAmount { field: "seed amount" });
                    }
                    Ok(())
                })
                .inspect_err(|e| tracing::warn!(operator = %caller, amount, error = %e, "Seed rejected"))?;

            let checkpoint = state.checkpoint(SlotCheckpoint::Untouched);
            state.liquidity = add(state.liquidity, amount, "liquidity")?;
            checkpoint
        };

        let movements = [Movement::NativeCollect {
            from: caller.clone(),
            amount,
        }];
        self.settle(&movements, checkpoint).await?;

        let liquidity = self.lock().liquidity;
        tracing::info!(operator = %caller, amount, liquidity, "Liquidity seeded");
        Ok(liquidity)
    }

    // === Query surface ===

    pub fn owner(&self) -> AccountId {
        self.lock().ownership.owner().clone()
    }

    pub fn is_paused(&self) -> bool {
        self.lock().paused
    }

    pub fn stats(&self) -> PoolStats {
        self.lock().pool_stats()
    }

    /// Every asset ever configured, in first-configured order
    pub fn supported_assets(&self) -> Vec<(AssetId, CollateralConfig)> {
        self.lock().registry.assets()
    }

    pub fn collateral_config(&self, asset: &AssetId) -> LendingResult<CollateralConfig> {
        self.lock().registry.get(asset)
    }

    /// Number of slots `user` has ever opened
    pub fn position_count(&self, user: &AccountId) -> usize {
        self.lock().positions.count(user)
    }

    pub fn position(&self, user: &AccountId, position_id: PositionId) -> LendingResult<Position> {
        self.lock().positions.get(user, position_id).cloned()
    }

    pub fn positions(&self, user: &AccountId) -> Vec<Position> {
        self.lock().positions.positions(user).to_vec()
    }

    /// Largest loan a fresh deposit of `collateral_amount` would admit
    pub async fn max_borrowable(
        &self,
        asset: &AssetId,
        collateral_amount: u128,
    ) -> LendingResult<u128> {
        let config = self.lock().registry.get_active(asset)?;
        let value = self
            .collateral_value(asset, collateral_amount, config.decimals)
            .await?;
        mul_div(
            value,
            u128::from(config.max_ltv_bps),
            BPS_DENOMINATOR,
            "max borrow",
        )
    }

    /// Collateral value, total debt, health factor and liquidatability
    ///
    /// Uses the same assessment as the liquidation gate.
    pub async fn position_health(
        &self,
        user: &AccountId,
        position_id: PositionId,
    ) -> LendingResult<PositionHealth> {
        let (position, config) = {
            let state = self.lock();
            let position = state.positions.get(user, position_id)?.clone();
            let config = state.registry.get(&position.collateral_asset)?;
            (position, config)
        };

        self.assess(&position, &config, self.clock.now()).await
    }

    // === Shared internals ===

    pub(crate) async fn collateral_value(
        &self,
        asset: &AssetId,
        amount: u128,
        decimals: u8,
    ) -> LendingResult<u128> {
        if amount == 0 {
            return Ok(0);
        }
        Ok(self.oracle.value_of(asset, amount, decimals).await?)
    }

    /// Health of `position` at `now`, valuing its collateral through the oracle
    pub(crate) async fn assess(
        &self,
        position: &Position,
        config: &CollateralConfig,
        now: u64,
    ) -> LendingResult<PositionHealth> {
        let value = self
            .collateral_value(
                &position.collateral_asset,
                position.collateral_amount,
                config.decimals,
            )
            .await?;
        let interest = self.interest.accrued_interest(position, now)?;
        PositionHealth::assess(value, position.debt, interest, config.liquidation_bps)
    }

    /// Run a settlement, rolling ledger effects back if it fails
    ///
    /// Effects are also rolled back if this future is dropped before the
    /// transport returns.
    pub(crate) async fn settle(
        &self,
        movements: &[Movement],
        checkpoint: Checkpoint,
    ) -> LendingResult<()> {
        let pending = PendingSettlement {
            pool: self,
            checkpoint: Some(checkpoint),
        };

        match self.transport.settle(movements).await {
            Ok(()) => {
                pending.commit();
                Ok(())
            }
            Err(err) => {
                tracing::error!(error = %err, "Settlement failed, rolling back ledger effects");
                pending.rollback();
                Err(settlement_error(err, movements))
            }
        }
    }
}

/// Ledger effects awaiting their settlement
///
/// Restores the checkpoint on drop unless committed.
struct PendingSettlement<'a> {
    pool: &'a LendingPool,
    checkpoint: Option<Checkpoint>,
}

impl PendingSettlement<'_> {
    fn commit(mut self) {
        self.checkpoint = None;
    }

    fn rollback(mut self) {
        if let Some(checkpoint) = self.checkpoint.take() {
            self.pool.lock().rollback(checkpoint);
        }
    }
}

impl Drop for PendingSettlement<'_> {
    fn drop(&mut self) {
        if let Some(checkpoint) = self.checkpoint.take() {
            tracing::warn!("Settlement abandoned before completion, rolling back ledger effects");
            self.pool.lock().rollback(checkpoint);
        }
    }
}

/// Map a transport failure to `PayoutFailed` when a base-currency payout
/// failed, `TransferFailed` otherwise
fn settlement_error(err: TransportError, movements: &[Movement]) -> LendingError {
    let payout = match err.failed_index().and_then(|i| movements.get(i)) {
        Some(movement) => movement.is_payout(),
        None => movements.iter().all(Movement::is_payout),
    };

    if payout {
        LendingError::PayoutFailed(err)
    } else {
        LendingError::TransferFailed(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lendbank_oracle::MockOracle;
    use lendbank_transport::{Holding, InMemoryBank};

    fn id(s: &str) -> AccountId {
        s.parse().unwrap()
    }

    fn pool() -> (LendingPool, Arc<InMemoryBank>) {
        let bank = Arc::new(InMemoryBank::new());
        let pool = LendingPool::new(
            id("ADMIN"),
            LendingConfig::default(),
            Arc::new(MockOracle::new()),
            bank.clone(),
        );
        (pool, bank)
    }

    #[test]
    fn test_admin_ops_require_owner() {
        let (pool, _) = pool();
        let tok: AssetId = "TOK".parse().unwrap();

        assert!(matches!(
            pool.configure_collateral(&id("MALLORY"), tok.clone(), 18, 7_500, 8_500),
            Err(LendingError::Unauthorized { .. })
        ));
        assert!(matches!(
            pool.set_paused(&id("MALLORY"), true),
            Err(LendingError::Unauthorized { .. })
        ));
        assert!(matches!(
            pool.transfer_ownership(&id("MALLORY"), id("MALLORY")),
            Err(LendingError::Unauthorized { .. })
        ));

        pool.configure_collateral(&id("ADMIN"), tok.clone(), 18, 7_500, 8_500)
            .unwrap();
        assert!(matches!(
            pool.deactivate_collateral(&id("MALLORY"), &tok),
            Err(LendingError::Unauthorized { .. })
        ));
    }

    #[test]
    fn test_transfer_ownership() {
        let (pool, _) = pool();
        pool.transfer_ownership(&id("ADMIN"), id("OPS")).unwrap();
        assert_eq!(pool.owner(), id("OPS"));
        assert!(pool.set_paused(&id("ADMIN"), true).is_err());
        pool.set_paused(&id("OPS"), true).unwrap();
        assert!(pool.is_paused());
    }

    #[test]
    fn test_guard_released_after_admin_error() {
        let (pool, _) = pool();
        assert!(pool.set_paused(&id("MALLORY"), true).is_err());
        assert!(!pool.guard.is_entered());
        assert!(pool.set_paused(&id("ADMIN"), true).is_ok());
    }

    #[tokio::test]
    async fn test_seed_liquidity() {
        let (pool, bank) = pool();
        bank.mint(&id("ADMIN"), Holding::Native, 1_000).unwrap();

        assert_eq!(pool.seed_liquidity(&id("ADMIN"), 600).await.unwrap(), 600);
        assert_eq!(pool.stats().available_liquidity, 600);
        assert_eq!(bank.balance(&AccountId::pool(), &Holding::Native), 600);
    }

    #[tokio::test]
    async fn test_seed_liquidity_rolls_back_on_failed_collect() {
        let (pool, _) = pool();

        // Admin holds no base currency
        let result = pool.seed_liquidity(&id("ADMIN"), 600).await;
        assert!(matches!(result, Err(LendingError::TransferFailed(_))));
        assert_eq!(pool.stats().available_liquidity, 0);
        assert!(!pool.guard.is_entered());
    }

    #[tokio::test]
    async fn test_seed_zero_rejected() {
        let (pool, _) = pool();
        let result = pool.seed_liquidity(&id("ADMIN"), 0).await;
        assert!(matches!(result, Err(LendingError::ZeroAmount { .. })));
    }

    #[test]
    fn test_settlement_error_mapping() {
        let bob = id("BOB");
        let movements = [
            Movement::NativeCollect {
                from: bob.clone(),
                amount: 1,
            },
            Movement::NativeTransfer {
                to: bob.clone(),
                amount: 1,
            },
        ];

        let collect_failed = TransportError::Rejected {
            index: 0,
            reason: "x".to_string(),
        };
        assert!(matches!(
            settlement_error(collect_failed, &movements),
            LendingError::TransferFailed(_)
        ));

        let refund_failed = TransportError::Rejected {
            index: 1,
            reason: "x".to_string(),
        };
        assert!(matches!(
            settlement_error(refund_failed, &movements),
            LendingError::PayoutFailed(_)
        ));

        let hook = TransportError::HookAborted("revert".to_string());
        assert!(matches!(
            settlement_error(hook.clone(), &movements[1..]),
            LendingError::PayoutFailed(_)
        ));
        assert!(matches!(
            settlement_error(hook, &movements),
            LendingError::TransferFailed(_)
        ));
    }
}
