//! Position Ledger - append-only borrowing positions per user
//!
//! Slots are never reused or removed. Closing a position zeroes it in place,
//! so a `(user, position_id)` pair stays a stable reference forever.

use lendbank_core::{AccountId, AssetId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{LendingError, LendingResult};

/// Per-user slot index
pub type PositionId = usize;

/// One borrowing position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub collateral_asset: AssetId,
    /// Native units of the collateral asset
    pub collateral_amount: u128,
    /// Base-currency wei, principal plus capitalized interest
    pub debt: u128,
    /// Unix seconds of the last interest capitalization
    pub last_accrual: u64,
}

impl Position {
    pub fn new(collateral_asset: AssetId, collateral_amount: u128, now: u64) -> Self {
        Self {
            collateral_asset,
            collateral_amount,
            debt: 0,
            last_accrual: now,
        }
    }

    /// Zeroed tombstone of a repaid or liquidated position
    pub fn is_closed(&self) -> bool {
        self.collateral_amount == 0 && self.debt == 0
    }

    /// Collateral deposited, no loan outstanding
    pub fn is_collateral_only(&self) -> bool {
        self.collateral_amount > 0 && self.debt == 0
    }

    /// Zero collateral and debt; `last_accrual` is left stale
    pub fn clear(&mut self) {
        self.collateral_amount = 0;
        self.debt = 0;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionLedger {
    positions: BTreeMap<AccountId, Vec<Position>>,
}

impl PositionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a position, returning its slot index
    pub fn open(&mut self, user: &AccountId, position: Position) -> PositionId {
        let slots = self.positions.entry(user.clone()).or_default();
        slots.push(position);
        slots.len() - 1
    }

    pub fn get(&self, user: &AccountId, position_id: PositionId) -> LendingResult<&Position> {
        self.positions
            .get(user)
            .and_then(|slots| slots.get(position_id))
            .ok_or_else(|| not_found(user, position_id))
    }

    pub fn get_mut(
        &mut self,
        user: &AccountId,
        position_id: PositionId,
    ) -> LendingResult<&mut Position> {
        self.positions
            .get_mut(user)
            .and_then(|slots| slots.get_mut(position_id))
            .ok_or_else(|| not_found(user, position_id))
    }

    /// A position that still holds collateral or debt
    pub fn get_open(&self, user: &AccountId, position_id: PositionId) -> LendingResult<&Position> {
        let position = self.get(user, position_id)?;
        if position.is_closed() {
            return Err(LendingError::PositionClosed {
                user: user.clone(),
                position_id,
            });
        }
        Ok(position)
    }

    /// Number of slots ever opened by `user`, closed ones included
    pub fn count(&self, user: &AccountId) -> usize {
        self.positions.get(user).map_or(0, Vec::len)
    }

    pub fn positions(&self, user: &AccountId) -> &[Position] {
        self.positions.get(user).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Undo the most recent `open` for `user` (aborted operation only)
    pub(crate) fn discard_last(&mut self, user: &AccountId) {
        if let Some(slots) = self.positions.get_mut(user) {
            slots.pop();
            if slots.is_empty() {
                self.positions.remove(user);
            }
        }
    }
}

fn not_found(user: &AccountId, position_id: PositionId) -> LendingError {
    LendingError::PositionNotFound {
        user: user.clone(),
        position_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> AccountId {
        "ALICE".parse().unwrap()
    }

    fn position(amount: u128) -> Position {
        Position::new("TOK".parse().unwrap(), amount, 1_000)
    }

    #[test]
    fn test_slots_are_append_only() {
        let mut ledger = PositionLedger::new();
        assert_eq!(ledger.open(&alice(), position(10)), 0);
        assert_eq!(ledger.open(&alice(), position(20)), 1);

        ledger.get_mut(&alice(), 0).unwrap().clear();

        // Closed slot persists as a tombstone, indices are stable
        assert_eq!(ledger.count(&alice()), 2);
        assert!(ledger.get(&alice(), 0).unwrap().is_closed());
        assert_eq!(ledger.get(&alice(), 1).unwrap().collateral_amount, 20);
        assert_eq!(ledger.open(&alice(), position(30)), 2);
    }

    #[test]
    fn test_get_open_rejects_tombstone() {
        let mut ledger = PositionLedger::new();
        let id = ledger.open(&alice(), position(10));
        ledger.get_mut(&alice(), id).unwrap().clear();

        assert!(matches!(
            ledger.get_open(&alice(), id),
            Err(LendingError::PositionClosed { .. })
        ));
    }

    #[test]
    fn test_unknown_position() {
        let ledger = PositionLedger::new();
        assert!(matches!(
            ledger.get(&alice(), 0),
            Err(LendingError::PositionNotFound { .. })
        ));
        assert_eq!(ledger.count(&alice()), 0);
        assert!(ledger.positions(&alice()).is_empty());
    }

    #[test]
    fn test_position_states() {
        let mut p = position(5);
        assert!(p.is_collateral_only());
        p.debt = 1;
        assert!(!p.is_collateral_only());
        p.clear();
        assert!(p.is_closed());
        assert_eq!(p.last_accrual, 1_000);
    }

    #[test]
    fn test_discard_last() {
        let mut ledger = PositionLedger::new();
        ledger.open(&alice(), position(10));
        ledger.discard_last(&alice());
        assert_eq!(ledger.count(&alice()), 0);
    }
}
