//! Interest Model
//!
//! Simple (non-compounding between capitalizations) interest on a position's
//! debt:
//!
//! `interest = debt * annual_rate_bps * elapsed / (10_000 * SECONDS_PER_YEAR)`
//!
//! The division floors, so accrued interest is rounded down in the borrower's
//! favour. Interest only compounds when it is capitalized into the debt by a
//! further borrow.

use crate::error::{LendingError, LendingResult};
use crate::math::{BPS_DENOMINATOR, SECONDS_PER_YEAR};
use crate::position::Position;

/// Default annual rate (5% APR)
pub const DEFAULT_ANNUAL_RATE_BPS: u16 = 500;

/// Interest accrual calculator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterestModel {
    annual_rate_bps: u16,
}

impl InterestModel {
    /// Create a new model with default rate
    pub fn new() -> Self {
        Self::with_rate(DEFAULT_ANNUAL_RATE_BPS)
    }

    /// Create with custom annual rate
    pub fn with_rate(annual_rate_bps: u16) -> Self {
        Self { annual_rate_bps }
    }

    pub fn annual_rate_bps(&self) -> u16 {
        self.annual_rate_bps
    }

    /// Interest owed on `position` at `now` on top of its recorded debt
    ///
    /// Zero for debt-free positions and for positions that never accrued.
    /// A clock reading earlier than the last accrual counts as no time passed.
    pub fn accrued_interest(&self, position: &Position, now: u64) -> LendingResult<u128> {
        if position.debt == 0 || position.last_accrual == 0 {
            return Ok(0);
        }

        let elapsed = u128::from(now.saturating_sub(position.last_accrual));
        let overflow = || LendingError::Overflow {
            context: "interest accrual",
        };

        let numerator = position
            .debt
            .checked_mul(u128::from(self.annual_rate_bps))
            .and_then(|v| v.checked_mul(elapsed))
            .ok_or_else(overflow)?;

        Ok(numerator / (BPS_DENOMINATOR * SECONDS_PER_YEAR))
    }
}

impl Default for InterestModel {
    fn default() -> Self {
        Self::new()
    }
}
