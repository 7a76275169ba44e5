//! AccountId - identity of a ledger participant
//!
//! Ids are case-insensitive and stored uppercased, the same way user ids are
//! normalized everywhere else in LendBank.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Reserved id of the lending pool's own account
const POOL_ACCOUNT: &str = "POOL";

/// Errors that can occur when parsing an account id
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccountIdError {
    #[error("Empty account id")]
    Empty,

    #[error("Account id too long (max 64 chars): {0}")]
    TooLong(String),

    #[error("Invalid account id format: {0}")]
    InvalidFormat(String),
}

/// Identity of a user, liquidator, operator or the pool
///
/// # Example
/// ```
/// use lendbank_core::AccountId;
///
/// let alice: AccountId = "alice".parse().unwrap();
/// assert_eq!(alice.as_str(), "ALICE");
/// assert!(!alice.is_pool());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(String);

impl AccountId {
    /// The pool's own account, holder of pooled liquidity and escrowed collateral
    pub fn pool() -> Self {
        Self(POOL_ACCOUNT.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_pool(&self) -> bool {
        self.0 == POOL_ACCOUNT
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AccountId {
    type Err = AccountIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_uppercase();

        if s.is_empty() {
            return Err(AccountIdError::Empty);
        }

        if s.len() > 64 {
            return Err(AccountIdError::TooLong(s));
        }

        if !s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(AccountIdError::InvalidFormat(s));
        }

        Ok(Self(s))
    }
}

impl TryFrom<String> for AccountId {
    type Error = AccountIdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<AccountId> for String {
    fn from(id: AccountId) -> Self {
        id.0
    }
}
