//! Movements - the unit of work of a settlement

use lendbank_core::{AccountId, AssetId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What an account holds: the base currency or units of a collateral asset
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Holding {
    Native,
    Asset(AssetId),
}

impl fmt::Display for Holding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Holding::Native => write!(f, "NATIVE"),
            Holding::Asset(asset) => write!(f, "{}", asset),
        }
    }
}

/// A single value movement between the pool and a counterparty
///
/// "In" and "collect" move value into the pool; "out" and "native transfer"
/// move value out of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Movement {
    /// Pull collateral from `from` into the pool
    TransferIn {
        asset: AssetId,
        from: AccountId,
        amount: u128,
    },
    /// Send collateral from the pool to `to`
    TransferOut {
        asset: AssetId,
        to: AccountId,
        amount: u128,
    },
    /// Pay base currency from the pool to `to`
    NativeTransfer { to: AccountId, amount: u128 },
    /// Collect base currency attached by `from` into the pool
    NativeCollect { from: AccountId, amount: u128 },
}

impl Movement {
    pub fn amount(&self) -> u128 {
        match self {
            Movement::TransferIn { amount, .. }
            | Movement::TransferOut { amount, .. }
            | Movement::NativeTransfer { amount, .. }
            | Movement::NativeCollect { amount, .. } => *amount,
        }
    }

    /// Which holding this movement touches
    pub fn holding(&self) -> Holding {
        match self {
            Movement::TransferIn { asset, .. } | Movement::TransferOut { asset, .. } => {
                Holding::Asset(asset.clone())
            }
            Movement::NativeTransfer { .. } | Movement::NativeCollect { .. } => Holding::Native,
        }
    }

    /// True for base-currency payouts leaving the pool
    pub fn is_payout(&self) -> bool {
        matches!(self, Movement::NativeTransfer { .. })
    }

    /// (debited account, credited account)
    pub fn endpoints(&self) -> (AccountId, AccountId) {
        match self {
            Movement::TransferIn { from, .. } | Movement::NativeCollect { from, .. } => {
                (from.clone(), AccountId::pool())
            }
            Movement::TransferOut { to, .. } | Movement::NativeTransfer { to, .. } => {
                (AccountId::pool(), to.clone())
            }
        }
    }
}
