//! Transport errors

use thiserror::Error;

use crate::movement::Holding;
use lendbank_core::AccountId;

/// Errors reported by an asset transport
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Movement #{index}: insufficient {holding} balance for {account}: available {available}, required {required}")]
    InsufficientBalance {
        index: usize,
        account: AccountId,
        holding: Holding,
        available: u128,
        required: u128,
    },

    #[error("Movement #{index} rejected: {reason}")]
    Rejected { index: usize, reason: String },

    #[error("Transfer hook aborted settlement: {0}")]
    HookAborted(String),

    #[error("Balance overflow for {account} holding {holding}")]
    Overflow { account: AccountId, holding: Holding },
}

/// Result type for transport operations
pub type TransportResult<T> = Result<T, TransportError>;

impl TransportError {
    /// Index of the movement that failed, if the failure is tied to one
    pub fn failed_index(&self) -> Option<usize> {
        match self {
            TransportError::InsufficientBalance { index, .. }
            | TransportError::Rejected { index, .. } => Some(*index),
            TransportError::HookAborted(_) | TransportError::Overflow { .. } => None,
        }
    }
}
