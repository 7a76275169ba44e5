//! Transport traits - interfaces for moving value

use async_trait::async_trait;
use lendbank_core::{AccountId, AssetId};

use crate::error::TransportResult;
use crate::movement::Movement;

/// Asset Transport - moves collateral and base currency
///
/// `settle` must be atomic: either every movement in the batch applies or
/// none does. Implementations may hand control to external code before
/// returning (token notification hooks), so callers must finalize their own
/// state before settling. A settlement whose future is dropped before it
/// completes must leave balances untouched.
#[async_trait]
pub trait AssetTransport: Send + Sync {
    /// Apply a batch of movements atomically
    async fn settle(&self, movements: &[Movement]) -> TransportResult<()>;

    /// Pull `amount` of `asset` from `from` into the pool
    async fn transfer_in(
        &self,
        asset: &AssetId,
        from: &AccountId,
        amount: u128,
    ) -> TransportResult<()> {
        self.settle(&[Movement::TransferIn {
            asset: asset.clone(),
            from: from.clone(),
            amount,
        }])
        .await
    }

    /// Send `amount` of `asset` from the pool to `to`
    async fn transfer_out(
        &self,
        asset: &AssetId,
        to: &AccountId,
        amount: u128,
    ) -> TransportResult<()> {
        self.settle(&[Movement::TransferOut {
            asset: asset.clone(),
            to: to.clone(),
            amount,
        }])
        .await
    }

    /// Pay `amount` of base currency from the pool to `to`
    async fn native_transfer(&self, to: &AccountId, amount: u128) -> TransportResult<()> {
        self.settle(&[Movement::NativeTransfer {
            to: to.clone(),
            amount,
        }])
        .await
    }

    /// Collect `amount` of base currency attached by `from`
    async fn native_collect(&self, from: &AccountId, amount: u128) -> TransportResult<()> {
        self.settle(&[Movement::NativeCollect {
            from: from.clone(),
            amount,
        }])
        .await
    }
}

/// Hook run by a transport before it applies a settlement
///
/// Models the notification callbacks some asset types execute on transfer.
/// Returning `Err` aborts the settlement.
#[async_trait]
pub trait TransferHook: Send + Sync {
    /// Hook name for logging/debugging
    fn name(&self) -> &str;

    async fn before_settle(&self, movements: &[Movement]) -> TransportResult<()>;
}
