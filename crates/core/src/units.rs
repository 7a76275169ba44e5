//! Unit conversion between human decimal amounts and integer base units
//!
//! Ledger arithmetic is done on `u128` base units (wei for the base currency,
//! the asset's smallest unit for collateral). `Decimal` is only used at the
//! edges, for parsing operator input and for display.

use rust_decimal::Decimal;
use thiserror::Error;

/// Decimal precision of the base currency
pub const BASE_DECIMALS: u8 = 18;

/// Errors that can occur when converting amounts
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnitsError {
    #[error("Amount cannot be negative: {0}")]
    Negative(Decimal),

    #[error("Amount {value} has more than {decimals} fractional digits")]
    TooPrecise { value: Decimal, decimals: u8 },

    #[error("Amount {value} does not fit in base units with {decimals} decimals")]
    Overflow { value: Decimal, decimals: u8 },
}

/// Convert a human amount into integer base units.
///
/// # Example
/// ```
/// use lendbank_core::parse_units;
/// use rust_decimal::Decimal;
///
/// let wei = parse_units(Decimal::new(75, 1), 18).unwrap(); // 7.5
/// assert_eq!(wei, 7_500_000_000_000_000_000);
/// ```
pub fn parse_units(value: Decimal, decimals: u8) -> Result<u128, UnitsError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(UnitsError::Negative(value));
    }

    let normalized = value.normalize();
    let scale = normalized.scale();
    if scale > u32::from(decimals) {
        return Err(UnitsError::TooPrecise { value, decimals });
    }

    let overflow = || UnitsError::Overflow { value, decimals };
    let mantissa = u128::try_from(normalized.mantissa()).map_err(|_| overflow())?;
    let factor = 10u128
        .checked_pow(u32::from(decimals) - scale)
        .ok_or_else(overflow)?;

    mantissa.checked_mul(factor).ok_or_else(overflow)
}

/// Format integer base units as a human amount, trimming trailing zeros.
///
/// Works on the full `u128` range, which exceeds what `Decimal` can hold.
pub fn format_units(amount: u128, decimals: u8) -> String {
    if decimals == 0 {
        return amount.to_string();
    }

    let width = usize::from(decimals) + 1;
    let digits = format!("{:0>width$}", amount, width = width);
    let (int_part, frac_part) = digits.split_at(digits.len() - usize::from(decimals));
    let frac_part = frac_part.trim_end_matches('0');

    if frac_part.is_empty() {
        int_part.to_string()
    } else {
        format!("{}.{}", int_part, frac_part)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_whole_tokens() {
        assert_eq!(parse_units(dec!(100), 18).unwrap(), 100 * 10u128.pow(18));
    }

    #[test]
    fn test_parse_fraction() {
        assert_eq!(parse_units(dec!(0.01), 18).unwrap(), 10u128.pow(16));
        assert_eq!(parse_units(dec!(1.5), 6).unwrap(), 1_500_000);
    }

    #[test]
    fn test_parse_trailing_zeros_ignored() {
        assert_eq!(parse_units(dec!(2.50000), 1).unwrap(), 25);
    }

    #[test]
    fn test_parse_rejects_negative() {
        let result = parse_units(dec!(-1), 18);
        assert!(matches!(result, Err(UnitsError::Negative(_))));
    }

    #[test]
    fn test_parse_rejects_too_precise() {
        let result = parse_units(dec!(0.001), 2);
        assert!(matches!(result, Err(UnitsError::TooPrecise { .. })));
    }

    #[test]
    fn test_parse_rejects_overflow() {
        let result = parse_units(dec!(79228162514264337593543950335), 18);
        assert!(matches!(result, Err(UnitsError::Overflow { .. })));
    }

    #[test]
    fn test_format_units() {
        assert_eq!(format_units(7_500_000_000_000_000_000, 18), "7.5");
        assert_eq!(format_units(10u128.pow(18), 18), "1");
        assert_eq!(format_units(1, 18), "0.000000000000000001");
        assert_eq!(format_units(0, 6), "0");
        assert_eq!(format_units(42, 0), "42");
    }

    #[test]
    fn test_format_full_range() {
        let formatted = format_units(u128::MAX, 18);
        assert!(formatted.starts_with("340282366920938463463"));
    }
}
