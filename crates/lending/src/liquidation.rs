//! Liquidation Engine
//!
//! Forced closure of a position whose total debt has reached its liquidation
//! threshold. One discrete event: the liquidator pays at least the total debt
//! and receives all of the position's collateral. Nothing is returned to the
//! position owner.

use lendbank_core::{AccountId, AssetId};
use lendbank_transport::Movement;
use serde::{Deserialize, Serialize};

use crate::error::{LendingError, LendingResult};
use crate::math::add;
use crate::pool::LendingPool;
use crate::position::PositionId;
use crate::state::SlotCheckpoint;

/// Result of a liquidation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidationOutcome {
    pub user: AccountId,
    pub position_id: PositionId,
    pub collateral_asset: AssetId,
    /// Collateral handed to the liquidator
    pub collateral_seized: u128,
    pub collateral_value: u128,
    pub total_debt: u128,
    pub interest: u128,
    pub refund: u128,
}

impl LendingPool {
    /// Liquidate `user`'s position `position_id`; callable by anyone
    pub async fn liquidate(
        &self,
        liquidator: &AccountId,
        user: &AccountId,
        position_id: PositionId,
        payment: u128,
    ) -> LendingResult<LiquidationOutcome> {
        let _token = self.guard.enter()?;

        self.try_liquidate(liquidator, user, position_id, payment)
            .await
            .inspect_err(|e| {
                tracing::warn!(
                    liquidator = %liquidator,
                    user = %user,
                    position_id,
                    error = %e,
                    "Liquidation rejected"
                )
            })
    }

    async fn try_liquidate(
        &self,
        liquidator: &AccountId,
        user: &AccountId,
        position_id: PositionId,
        payment: u128,
    ) -> LendingResult<LiquidationOutcome> {
        let now = self.clock.now();

        let (position, config) = {
            let state = self.lock();
            let position = state.positions.get_open(user, position_id)?.clone();
            let config = state.registry.get(&position.collateral_asset)?;
            (position, config)
        };

        let health = self.assess(&position, &config, now).await?;
        tracing::debug!(
            collateral_value = health.collateral_value,
            total_debt = health.total_debt,
            threshold = health.threshold,
            "Liquidation gate"
        );

        if !health.liquidatable {
            return Err(LendingError::PositionHealthy {
                total_debt: health.total_debt,
                threshold: health.threshold,
            });
        }
        if payment < health.total_debt {
            return Err(LendingError::InsufficientLiquidationPayment {
                total_debt: health.total_debt,
                paid: payment,
            });
        }

        let interest = health.total_debt - position.debt;

        let checkpoint = {
            let mut state = self.lock();

            let liquidity = add(state.liquidity, health.total_debt, "liquidity")?;
            let liquidated = add(
                state.stats.total_liquidated,
                health.total_debt,
                "total liquidated",
            )?;
            let collected = add(
                state.stats.total_interest_collected,
                interest,
                "interest collected",
            )?;

            let checkpoint = state.checkpoint(SlotCheckpoint::Replaced {
                user: user.clone(),
                position_id,
                previous: position.clone(),
            });
            state.positions.get_mut(user, position_id)?.clear();
            state.liquidity = liquidity;
            state.stats.total_liquidated = liquidated;
            state.stats.total_interest_collected = collected;
            checkpoint
        };

        let refund = payment - health.total_debt;
        let mut movements = vec![
            Movement::NativeCollect {
                from: liquidator.clone(),
                amount: payment,
            },
            Movement::TransferOut {
                asset: position.collateral_asset.clone(),
                to: liquidator.clone(),
                amount: position.collateral_amount,
            },
        ];
        if refund > 0 {
            movements.push(Movement::NativeTransfer {
                to: liquidator.clone(),
                amount: refund,
            });
        }
        self.settle(&movements, checkpoint).await?;

        tracing::info!(
            liquidator = %liquidator,
            user = %user,
            position_id,
            collateral_seized = position.collateral_amount,
            total_debt = health.total_debt,
            refund,
            "Position liquidated"
        );

        Ok(LiquidationOutcome {
            user: user.clone(),
            position_id,
            collateral_asset: position.collateral_asset,
            collateral_seized: position.collateral_amount,
            collateral_value: health.collateral_value,
            total_debt: health.total_debt,
            interest,
            refund,
        })
    }
}
