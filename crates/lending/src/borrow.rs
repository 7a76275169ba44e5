//! Borrow/Repay protocol
//!
//! Opening, extending and closing positions. Each operation finalizes the
//! ledger before handing movements to the transport.

use lendbank_core::{AccountId, AssetId};
use lendbank_transport::Movement;
use serde::{Deserialize, Serialize};

use crate::error::{LendingError, LendingResult};
use crate::math::{add, mul_div, sub, BPS_DENOMINATOR};
use crate::pool::LendingPool;
use crate::position::{Position, PositionId};
use crate::registry::CollateralConfig;
use crate::state::SlotCheckpoint;

/// Result of opening a position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenReceipt {
    pub position_id: PositionId,
    pub collateral_amount: u128,
    pub borrowed: u128,
}

/// Result of drawing more against a position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowReceipt {
    pub borrowed: u128,
    /// Interest capitalized into the debt by this borrow
    pub interest_capitalized: u128,
    pub debt: u128,
}

/// Result of a full repayment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepayReceipt {
    pub owed: u128,
    pub interest: u128,
    pub collateral_returned: u128,
    pub refund: u128,
}

/// Loan-to-value admission check, then liquidity
fn admit(
    config: &CollateralConfig,
    collateral_value: u128,
    debt: u128,
    interest: u128,
    requested: u128,
    available: u128,
) -> LendingResult<()> {
    let max_borrow = mul_div(
        collateral_value,
        u128::from(config.max_ltv_bps),
        BPS_DENOMINATOR,
        "max borrow",
    )?;
    let total = add(add(debt, interest, "total debt")?, requested, "total debt")?;

    if total > max_borrow {
        return Err(LendingError::ExceedsLoanToValue {
            debt,
            interest,
            requested,
            max_borrow,
        });
    }
    if available < requested {
        return Err(LendingError::InsufficientLiquidity {
            available,
            requested,
        });
    }
    Ok(())
}

impl LendingPool {
    /// Deposit collateral into a new slot, optionally borrowing against it
    pub async fn open_position(
        &self,
        user: &AccountId,
        asset: &AssetId,
        collateral_amount: u128,
        borrow_amount: u128,
    ) -> LendingResult<OpenReceipt> {
        let _token = self.guard.enter()?;

        self.try_open(user, asset, collateral_amount, borrow_amount)
            .await
            .inspect_err(|e| {
                tracing::warn!(user = %user, asset = %asset, error = %e, "Open position rejected")
            })
    }

    async fn try_open(
        &self,
        user: &AccountId,
        asset: &AssetId,
        collateral_amount: u128,
        borrow_amount: u128,
    ) -> LendingResult<OpenReceipt> {
        let now = self.clock.now();

        let config = {
            let state = self.lock();
            if state.paused {
                return Err(LendingError::Paused);
            }
            if collateral_amount == 0 {
                return Err(LendingError::ZeroAmount {
                    field: "collateral amount",
                });
            }
            state.registry.get_active(asset)?
        };

        let collateral_value = if borrow_amount > 0 {
            self.collateral_value(asset, collateral_amount, config.decimals)
                .await?
        } else {
            0
        };

        let (position_id, checkpoint) = {
            let mut state = self.lock();

            if borrow_amount > 0 {
                tracing::debug!(
                    collateral_value,
                    max_ltv_bps = config.max_ltv_bps,
                    requested = borrow_amount,
                    "Admission check"
                );
                admit(&config, collateral_value, 0, 0, borrow_amount, state.liquidity)?;
            }

            let mut position = Position::new(asset.clone(), collateral_amount, now);
            position.debt = borrow_amount;

            let liquidity = sub(state.liquidity, borrow_amount, "liquidity")?;
            let total_borrowed = add(state.stats.total_borrowed, borrow_amount, "total borrowed")?;

            let checkpoint = state.checkpoint(SlotCheckpoint::Appended { user: user.clone() });
            let position_id = state.positions.open(user, position);
            state.liquidity = liquidity;
            state.stats.total_borrowed = total_borrowed;
            (position_id, checkpoint)
        };

        let mut movements = vec![Movement::TransferIn {
            asset: asset.clone(),
            from: user.clone(),
            amount: collateral_amount,
        }];
        if borrow_amount > 0 {
            movements.push(Movement::NativeTransfer {
                to: user.clone(),
                amount: borrow_amount,
            });
        }
        self.settle(&movements, checkpoint).await?;

        tracing::info!(
            user = %user,
            asset = %asset,
            position_id,
            collateral_amount,
            borrowed = borrow_amount,
            "Position opened"
        );

        Ok(OpenReceipt {
            position_id,
            collateral_amount,
            borrowed: borrow_amount,
        })
    }

    /// Draw `amount` more against an open position
    ///
    /// Accrued interest is capitalized into the debt and the accrual clock
    /// restarts.
    pub async fn borrow_more(
        &self,
        user: &AccountId,
        position_id: PositionId,
        amount: u128,
    ) -> LendingResult<BorrowReceipt> {
        let _token = self.guard.enter()?;

        self.try_borrow_more(user, position_id, amount)
            .await
            .inspect_err(|e| {
                tracing::warn!(user = %user, position_id, amount, error = %e, "Borrow rejected")
            })
    }

    async fn try_borrow_more(
        &self,
        user: &AccountId,
        position_id: PositionId,
        amount: u128,
    ) -> LendingResult<BorrowReceipt> {
        let now = self.clock.now();

        let (position, config) = {
            let state = self.lock();
            if state.paused {
                return Err(LendingError::Paused);
            }
            if amount == 0 {
                return Err(LendingError::ZeroAmount {
                    field: "borrow amount",
                });
            }
            let position = state.positions.get_open(user, position_id)?.clone();
            let config = state.registry.get(&position.collateral_asset)?;
            (position, config)
        };

        let collateral_value = self
            .collateral_value(
                &position.collateral_asset,
                position.collateral_amount,
                config.decimals,
            )
            .await?;
        let interest = self.interest.accrued_interest(&position, now)?;

        let (debt, checkpoint) = {
            let mut state = self.lock();

            tracing::debug!(
                collateral_value,
                debt = position.debt,
                interest,
                requested = amount,
                "Admission check"
            );
            admit(
                &config,
                collateral_value,
                position.debt,
                interest,
                amount,
                state.liquidity,
            )?;

            let debt = add(add(position.debt, interest, "debt")?, amount, "debt")?;
            let liquidity = sub(state.liquidity, amount, "liquidity")?;
            let total_borrowed = add(state.stats.total_borrowed, amount, "total borrowed")?;

            let checkpoint = state.checkpoint(SlotCheckpoint::Replaced {
                user: user.clone(),
                position_id,
                previous: position.clone(),
            });
            let slot = state.positions.get_mut(user, position_id)?;
            slot.debt = debt;
            slot.last_accrual = now;
            state.liquidity = liquidity;
            state.stats.total_borrowed = total_borrowed;
            (debt, checkpoint)
        };

        let movements = [Movement::NativeTransfer {
            to: user.clone(),
            amount,
        }];
        self.settle(&movements, checkpoint).await?;

        tracing::info!(
            user = %user,
            position_id,
            borrowed = amount,
            interest_capitalized = interest,
            debt,
            "Borrowed against position"
        );

        Ok(BorrowReceipt {
            borrowed: amount,
            interest_capitalized: interest,
            debt,
        })
    }

    /// Repay a position in full and take back its collateral
    ///
    /// `payment` is the base currency attached by `user`; anything above
    /// what is owed is refunded.
    pub async fn repay(
        &self,
        user: &AccountId,
        position_id: PositionId,
        payment: u128,
    ) -> LendingResult<RepayReceipt> {
        let _token = self.guard.enter()?;

        self.try_repay(user, position_id, payment)
            .await
            .inspect_err(|e| {
                tracing::warn!(user = %user, position_id, payment, error = %e, "Repay rejected")
            })
    }

    async fn try_repay(
        &self,
        user: &AccountId,
        position_id: PositionId,
        payment: u128,
    ) -> LendingResult<RepayReceipt> {
        let now = self.clock.now();

        let (receipt, asset, checkpoint) = {
            let mut state = self.lock();
            let position = state.positions.get_open(user, position_id)?.clone();

            let interest = self.interest.accrued_interest(&position, now)?;
            let owed = add(position.debt, interest, "amount owed")?;
            tracing::debug!(debt = position.debt, interest, owed, paid = payment, "Repayment check");
            if payment < owed {
                return Err(LendingError::InsufficientRepayment { owed, paid: payment });
            }

            let liquidity = add(state.liquidity, owed, "liquidity")?;
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
            state.stats.total_interest_collected = collected;

            let receipt = RepayReceipt {
                owed,
                interest,
                collateral_returned: position.collateral_amount,
                refund: payment - owed,
            };
            (receipt, position.collateral_asset, checkpoint)
        };

        let mut movements = Vec::with_capacity(3);
        if payment > 0 {
            movements.push(Movement::NativeCollect {
                from: user.clone(),
                amount: payment,
            });
        }
        movements.push(Movement::TransferOut {
            asset: asset.clone(),
            to: user.clone(),
            amount: receipt.collateral_returned,
        });
        if receipt.refund > 0 {
            movements.push(Movement::NativeTransfer {
                to: user.clone(),
                amount: receipt.refund,
            });
        }
        self.settle(&movements, checkpoint).await?;

        tracing::info!(
            user = %user,
            position_id,
            owed = receipt.owed,
            interest = receipt.interest,
            refund = receipt.refund,
            "Position repaid"
        );

        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WAD: u128 = 1_000_000_000_000_000_000;

    fn config() -> CollateralConfig {
        CollateralConfig::new(18, 7_500, 8_500).unwrap()
    }

    #[test]
    fn test_admit_at_limit() {
        // value 10, 75% LTV: exactly 7.5 admitted
        assert!(admit(&config(), 10 * WAD, 0, 0, 75 * WAD / 10, 100 * WAD).is_ok());
    }

    #[test]
    fn test_admit_counts_interest() {
        let result = admit(&config(), 10 * WAD, 7 * WAD, WAD / 2, 1, 100 * WAD);
        assert!(matches!(
            result,
            Err(LendingError::ExceedsLoanToValue {
                interest,
                max_borrow,
                ..
            }) if interest == WAD / 2 && max_borrow == 75 * WAD / 10
        ));
    }

    #[test]
    fn test_admit_checks_ltv_before_liquidity() {
        let result = admit(&config(), 10 * WAD, 0, 0, 8 * WAD, 0);
        assert!(matches!(result, Err(LendingError::ExceedsLoanToValue { .. })));

        let result = admit(&config(), 10 * WAD, 0, 0, 7 * WAD, WAD);
        assert_eq!(
            result,
            Err(LendingError::InsufficientLiquidity {
                available: WAD,
                requested: 7 * WAD,
            })
        );
    }

    #[test]
    fn test_admit_zero_value_collateral() {
        assert!(matches!(
            admit(&config(), 0, 0, 0, 1, WAD),
            Err(LendingError::ExceedsLoanToValue { max_borrow: 0, .. })
        ));
    }
}
