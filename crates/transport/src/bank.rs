//! In-memory bank - reference transport for tests and the sandbox CLI

use async_trait::async_trait;
use lendbank_core::AccountId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::error::{TransportError, TransportResult};
use crate::movement::{Holding, Movement};
use crate::traits::{AssetTransport, TransferHook};

/// Which movements an injected failure applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureMode {
    /// Reject every settlement
    Any,
    /// Reject settlements containing a base-currency payout
    Payouts,
    /// Reject settlements containing a collateral movement
    Collateral,
}

impl FailureMode {
    fn matches(&self, movement: &Movement) -> bool {
        match self {
            FailureMode::Any => true,
            FailureMode::Payouts => movement.is_payout(),
            FailureMode::Collateral => matches!(movement.holding(), Holding::Asset(_)),
        }
    }
}

/// One balance line of an exported bank
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceRecord {
    pub account: AccountId,
    pub holding: Holding,
    pub amount: u128,
}

/// Serializable bank contents
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankSnapshot {
    pub balances: Vec<BalanceRecord>,
}

type Balances = HashMap<(AccountId, Holding), u128>;

/// In-memory asset transport
///
/// Keeps per-(account, holding) balances and applies each settlement to a
/// working copy that is swapped in only when every movement succeeded.
#[derive(Default)]
pub struct InMemoryBank {
    balances: Mutex<Balances>,
    failure: RwLock<Option<FailureMode>>,
    hook: RwLock<Option<Arc<dyn TransferHook>>>,
}

impl InMemoryBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a bank from an exported snapshot
    pub fn from_snapshot(snapshot: BankSnapshot) -> Self {
        let balances = snapshot
            .balances
            .into_iter()
            .map(|r| ((r.account, r.holding), r.amount))
            .collect();
        Self {
            balances: Mutex::new(balances),
            ..Self::default()
        }
    }

    /// Export non-zero balances, ordered by account then holding
    pub fn snapshot(&self) -> BankSnapshot {
        let balances = self.lock_balances();
        let mut records: Vec<BalanceRecord> = balances
            .iter()
            .filter(|(_, amount)| **amount > 0)
            .map(|((account, holding), amount)| BalanceRecord {
                account: account.clone(),
                holding: holding.clone(),
                amount: *amount,
            })
            .collect();
        records.sort_by(|a, b| (&a.account, &a.holding).cmp(&(&b.account, &b.holding)));
        BankSnapshot { balances: records }
    }

    /// Credit an account out of thin air (faucet for tests and the sandbox)
    pub fn mint(&self, account: &AccountId, holding: Holding, amount: u128) -> TransportResult<()> {
        let mut balances = self.lock_balances();
        let entry = balances.entry((account.clone(), holding.clone())).or_insert(0);
        *entry = entry
            .checked_add(amount)
            .ok_or_else(|| TransportError::Overflow {
                account: account.clone(),
                holding,
            })?;
        Ok(())
    }

    /// Current balance (0 if never credited)
    pub fn balance(&self, account: &AccountId, holding: &Holding) -> u128 {
        self.lock_balances()
            .get(&(account.clone(), holding.clone()))
            .copied()
            .unwrap_or(0)
    }

    /// Inject (or clear) a failure for subsequent settlements
    pub fn set_failure(&self, mode: Option<FailureMode>) {
        *self.failure.write().unwrap_or_else(PoisonError::into_inner) = mode;
    }

    /// Install a hook that runs before every settlement
    pub fn set_hook(&self, hook: Arc<dyn TransferHook>) {
        *self.hook.write().unwrap_or_else(PoisonError::into_inner) = Some(hook);
    }

    pub fn clear_hook(&self) {
        *self.hook.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn lock_balances(&self) -> std::sync::MutexGuard<'_, Balances> {
        self.balances.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_injected_failure(&self, movements: &[Movement]) -> TransportResult<()> {
        let failure = *self.failure.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(mode) = failure {
            if let Some(index) = movements.iter().position(|m| mode.matches(m)) {
                return Err(TransportError::Rejected {
                    index,
                    reason: format!("injected failure ({:?})", mode),
                });
            }
        }
        Ok(())
    }

    fn apply(balances: &Balances, movements: &[Movement]) -> TransportResult<Balances> {
        let mut next = balances.clone();

        for (index, movement) in movements.iter().enumerate() {
            let holding = movement.holding();
            let amount = movement.amount();
            let (debit, credit) = movement.endpoints();

            let available = next
                .get(&(debit.clone(), holding.clone()))
                .copied()
                .unwrap_or(0);
            if available < amount {
                return Err(TransportError::InsufficientBalance {
                    index,
                    account: debit,
                    holding,
                    available,
                    required: amount,
                });
            }
            next.insert((debit, holding.clone()), available - amount);

            let credited = next.entry((credit.clone(), holding.clone())).or_insert(0);
            *credited = credited
                .checked_add(amount)
                .ok_or(TransportError::Overflow {
                    account: credit,
                    holding,
                })?;
        }

        Ok(next)
    }
}

#[async_trait]
impl AssetTransport for InMemoryBank {
    async fn settle(&self, movements: &[Movement]) -> TransportResult<()> {
        let hook = self
            .hook
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        if let Some(hook) = hook {
            tracing::debug!(hook = hook.name(), "Running transfer hook");
            hook.before_settle(movements).await?;
        }

        self.check_injected_failure(movements)?;

        let mut balances = self.lock_balances();
        let next = Self::apply(&balances, movements)?;
        *balances = next;

        tracing::debug!(movements = movements.len(), "Settlement applied");
        Ok(())
    }
}
