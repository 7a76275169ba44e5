//! Oracle error types

use lendbank_core::AssetId;
use thiserror::Error;

/// Oracle-related errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OracleError {
    /// The asset has never been priced
    #[error("No price set for {asset}")]
    PriceUnset { asset: AssetId },

    /// Price data is invalid
    #[error("Invalid price for {asset}: {reason}")]
    InvalidPrice { asset: AssetId, reason: String },

    /// Valuation does not fit in base units
    #[error("Valuation overflow for {amount} units of {asset}")]
    Overflow { asset: AssetId, amount: u128 },
}
