//! Administrative authorization
//!
//! A single owner identity, checked on every privileged entry point.

use lendbank_core::AccountId;
use serde::{Deserialize, Serialize};

use crate::error::{LendingError, LendingResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ownership {
    owner: AccountId,
}

impl Ownership {
    pub fn new(owner: AccountId) -> Self {
        Self { owner }
    }

    pub fn owner(&self) -> &AccountId {
        &self.owner
    }

    /// Fail with `Unauthorized` unless `caller` is the owner
    pub fn ensure(&self, caller: &AccountId) -> LendingResult<()> {
        if caller == &self.owner {
            Ok(())
        } else {
            Err(LendingError::Unauthorized {
                caller: caller.clone(),
            })
        }
    }

    /// Hand control to `new_owner`, returning the previous owner
    pub fn transfer(&mut self, caller: &AccountId, new_owner: AccountId) -> LendingResult<AccountId> {
        self.ensure(caller)?;
        Ok(std::mem::replace(&mut self.owner, new_owner))
    }
}
