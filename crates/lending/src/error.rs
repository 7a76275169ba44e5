//! Lending engine errors

use lendbank_core::{AccountId, AssetId};
use lendbank_oracle::OracleError;
use lendbank_transport::TransportError;
use thiserror::Error;

use crate::position::PositionId;

/// Every way a lending operation can be rejected
///
/// Each variant carries the values the failing check saw, so the caller can
/// correct the request. A returned error always means no state changed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LendingError {
    #[error("Invalid collateral parameters: {reason}")]
    InvalidParameters { reason: String },

    #[error("Unauthorized: {caller} is not the owner")]
    Unauthorized { caller: AccountId },

    #[error("Asset not supported: {asset}")]
    AssetNotSupported { asset: AssetId },

    #[error("{field} must be greater than zero")]
    ZeroAmount { field: &'static str },

    #[error("Exceeds loan-to-value: debt {debt} + interest {interest} + requested {requested} > max borrow {max_borrow}")]
    ExceedsLoanToValue {
        debt: u128,
        interest: u128,
        requested: u128,
        max_borrow: u128,
    },

    #[error("Insufficient liquidity: available {available}, requested {requested}")]
    InsufficientLiquidity { available: u128, requested: u128 },

    #[error("Insufficient repayment: owed {owed}, paid {paid}")]
    InsufficientRepayment { owed: u128, paid: u128 },

    #[error("Insufficient liquidation payment: total debt {total_debt}, paid {paid}")]
    InsufficientLiquidationPayment { total_debt: u128, paid: u128 },

    #[error("Position healthy: total debt {total_debt} below liquidation threshold {threshold}")]
    PositionHealthy { total_debt: u128, threshold: u128 },

    #[error("Collateral transfer failed: {0}")]
    TransferFailed(TransportError),

    #[error("Payout failed: {0}")]
    PayoutFailed(TransportError),

    #[error("No price set for {asset}")]
    PriceUnset { asset: AssetId },

    #[error("Oracle error: {0}")]
    Oracle(OracleError),

    #[error("Lending is paused")]
    Paused,

    #[error("Reentrant call rejected: another operation is in progress")]
    Reentrancy,

    #[error("Position not found: {user} #{position_id}")]
    PositionNotFound {
        user: AccountId,
        position_id: PositionId,
    },

    #[error("Position closed: {user} #{position_id}")]
    PositionClosed {
        user: AccountId,
        position_id: PositionId,
    },

    #[error("Arithmetic overflow in {context}")]
    Overflow { context: &'static str },
}

/// Result type for lending operations
pub type LendingResult<T> = Result<T, LendingError>;

impl From<OracleError> for LendingError {
    fn from(err: OracleError) -> Self {
        match err {
            OracleError::PriceUnset { asset } => LendingError::PriceUnset { asset },
            other => LendingError::Oracle(other),
        }
    }
}

impl LendingError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        LendingError::InvalidParameters {
            reason: reason.into(),
        }
    }
}
