//! Position health
//!
//! `PositionHealth::assess` is the single place the liquidation predicate is
//! computed. The health query and the liquidation gate both call it with the
//! same snapshot, so they cannot disagree.

use serde::{Deserialize, Serialize};

use crate::error::LendingResult;
use crate::math::{add, mul_div, BPS_DENOMINATOR};

/// Health factor reported for a position without debt
pub const HEALTH_FACTOR_MAX: u128 = u128::MAX;

/// Health of a position at one instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionHealth {
    /// Base-currency value of the collateral
    pub collateral_value: u128,
    /// Recorded debt plus accrued interest
    pub total_debt: u128,
    /// `collateral_value * liquidation_bps / total_debt`, or `HEALTH_FACTOR_MAX`
    /// without debt. At or below 10_000 the position is at its threshold.
    pub health_factor: u128,
    /// `collateral_value * liquidation_bps / 10_000`
    pub threshold: u128,
    pub liquidatable: bool,
}

impl PositionHealth {
    pub fn assess(
        collateral_value: u128,
        debt: u128,
        interest: u128,
        liquidation_bps: u16,
    ) -> LendingResult<Self> {
        let total_debt = add(debt, interest, "total debt")?;
        let liquidation_bps = u128::from(liquidation_bps);
        let threshold = mul_div(
            collateral_value,
            liquidation_bps,
            BPS_DENOMINATOR,
            "liquidation threshold",
        )?;

        let health_factor = if total_debt > 0 {
            mul_div(collateral_value, liquidation_bps, total_debt, "health factor")?
        } else {
            HEALTH_FACTOR_MAX
        };

        Ok(Self {
            collateral_value,
            total_debt,
            health_factor,
            threshold,
            // A debt-free position has nothing to liquidate, even when its
            // collateral values to zero
            liquidatable: total_debt > 0 && total_debt >= threshold,
        })
    }
}
