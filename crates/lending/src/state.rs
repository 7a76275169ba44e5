//! Persistent pool state
//!
//! Everything the ledger owns: ownership, pause flag, collateral registry,
//! positions, pooled liquidity and informational counters. Serializable so
//! a host can persist it between runs.

use lendbank_core::AccountId;
use serde::{Deserialize, Serialize};

use crate::auth::Ownership;
use crate::position::{Position, PositionId, PositionLedger};
use crate::registry::CollateralRegistry;

/// Informational, monotonically increasing counters
///
/// Never consulted for correctness decisions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerStats {
    pub total_borrowed: u128,
    pub total_liquidated: u128,
    pub total_interest_collected: u128,
}

/// Read-only summary of the pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    pub owner: AccountId,
    pub paused: bool,
    /// Base currency available for new loans
    pub available_liquidity: u128,
    pub ledger: LedgerStats,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolState {
    pub ownership: Ownership,
    pub paused: bool,
    pub registry: CollateralRegistry,
    pub positions: PositionLedger,
    /// Pooled base currency: seeded liquidity plus repayments, minus loans
    pub liquidity: u128,
    pub stats: LedgerStats,
}

impl PoolState {
    pub fn new(owner: AccountId) -> Self {
        Self {
            ownership: Ownership::new(owner),
            paused: false,
            registry: CollateralRegistry::new(),
            positions: PositionLedger::new(),
            liquidity: 0,
            stats: LedgerStats::default(),
        }
    }

    pub fn pool_stats(&self) -> PoolStats {
        PoolStats {
            owner: self.ownership.owner().clone(),
            paused: self.paused,
            available_liquidity: self.liquidity,
            ledger: self.stats,
        }
    }

    /// Record what an operation is about to change
    pub(crate) fn checkpoint(&self, slot: SlotCheckpoint) -> Checkpoint {
        Checkpoint {
            slot,
            liquidity: self.liquidity,
            stats: self.stats,
        }
    }

    /// Undo the effects of an operation whose settlement failed
    pub(crate) fn rollback(&mut self, checkpoint: Checkpoint) {
        match checkpoint.slot {
            SlotCheckpoint::Untouched => {}
            SlotCheckpoint::Appended { user } => self.positions.discard_last(&user),
            SlotCheckpoint::Replaced {
                user,
                position_id,
                previous,
            } => {
                if let Ok(slot) = self.positions.get_mut(&user, position_id) {
                    *slot = previous;
                }
            }
        }
        self.liquidity = checkpoint.liquidity;
        self.stats = checkpoint.stats;
    }
}

/// Position slot touched by an in-flight operation
#[derive(Debug, Clone)]
pub(crate) enum SlotCheckpoint {
    Untouched,
    Appended {
        user: AccountId,
    },
    Replaced {
        user: AccountId,
        position_id: PositionId,
        previous: Position,
    },
}

/// Pre-effect values restored if settlement fails
#[derive(Debug, Clone)]
pub(crate) struct Checkpoint {
    slot: SlotCheckpoint,
    liquidity: u128,
    stats: LedgerStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> AccountId {
        "ALICE".parse().unwrap()
    }

    fn state_with_position() -> PoolState {
        let mut state = PoolState::new("ADMIN".parse().unwrap());
        state
            .positions
            .open(&alice(), Position::new("TOK".parse().unwrap(), 100, 1));
        state.liquidity = 50;
        state
    }

    #[test]
    fn test_rollback_replaced_slot() {
        let mut state = state_with_position();
        let previous = state.positions.get(&alice(), 0).unwrap().clone();
        let checkpoint = state.checkpoint(SlotCheckpoint::Replaced {
            user: alice(),
            position_id: 0,
            previous,
        });

        state.positions.get_mut(&alice(), 0).unwrap().debt = 40;
        state.liquidity = 10;
        state.stats.total_borrowed = 40;

        state.rollback(checkpoint);

        assert_eq!(state.positions.get(&alice(), 0).unwrap().debt, 0);
        assert_eq!(state.liquidity, 50);
        assert_eq!(state.stats, LedgerStats::default());
    }

    #[test]
    fn test_rollback_appended_slot() {
        let mut state = state_with_position();
        let checkpoint = state.checkpoint(SlotCheckpoint::Appended { user: alice() });
        state
            .positions
            .open(&alice(), Position::new("TOK".parse().unwrap(), 5, 2));

        state.rollback(checkpoint);
        assert_eq!(state.positions.count(&alice()), 1);
    }

    #[test]
    fn test_state_serde_roundtrip() {
        let state = state_with_position();
        let json = serde_json::to_string(&state).unwrap();
        let parsed: PoolState = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, state);
    }
}
