//! Checked integer helpers
//!
//! All ratios are in basis points and every division floors.

use crate::error::{LendingError, LendingResult};

/// 100% in basis points
pub const BPS_DENOMINATOR: u128 = 10_000;

/// Fixed year length for interest accrual; leap years are ignored
pub const SECONDS_PER_YEAR: u128 = 365 * 86_400;

/// `a * b / denominator`, rounding down
pub(crate) fn mul_div(
    a: u128,
    b: u128,
    denominator: u128,
    context: &'static str,
) -> LendingResult<u128> {
    a.checked_mul(b)
        .and_then(|product| product.checked_div(denominator))
        .ok_or(LendingError::Overflow { context })
}

pub(crate) fn add(a: u128, b: u128, context: &'static str) -> LendingResult<u128> {
    a.checked_add(b).ok_or(LendingError::Overflow { context })
}

pub(crate) fn sub(a: u128, b: u128, context: &'static str) -> LendingResult<u128> {
    a.checked_sub(b).ok_or(LendingError::Overflow { context })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mul_div_floors() {
        assert_eq!(mul_div(10, 7_500, BPS_DENOMINATOR, "t").unwrap(), 7);
        assert_eq!(mul_div(9_999, 1, BPS_DENOMINATOR, "t").unwrap(), 0);
    }

    #[test]
    fn test_mul_div_overflow() {
        let result = mul_div(u128::MAX, 2, 1, "ltv");
        assert_eq!(result, Err(LendingError::Overflow { context: "ltv" }));
    }

    #[test]
    fn test_zero_denominator_is_an_error() {
        assert!(mul_div(1, 1, 0, "t").is_err());
    }

    #[test]
    fn test_sub_underflow() {
        assert!(sub(1, 2, "liquidity").is_err());
        assert_eq!(add(1, 2, "t").unwrap(), 3);
    }
}
