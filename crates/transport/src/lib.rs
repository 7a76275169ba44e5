//! LendBank Asset Transport
//!
//! Moves fungible units between accounts. A settlement is a batch of
//! movements that either all apply or none do:
//!
//! ```text
//! Ledger effects finalized
//!     │
//!     ▼
//! ┌─────────────────────────────┐
//! │ TransferHook (optional)     │ ← may run arbitrary code, including
//! │                             │   calls back into the ledger
//! └─────────────────────────────┘
//!     │
//!     ▼
//! ┌─────────────────────────────┐
//! │ settle(&[Movement])         │ ← all-or-nothing
//! └─────────────────────────────┘
//! ```

pub mod bank;
pub mod error;
pub mod movement;
pub mod traits;

pub use bank::{BalanceRecord, BankSnapshot, FailureMode, InMemoryBank};
pub use error::{TransportError, TransportResult};
pub use movement::{Holding, Movement};
pub use traits::{AssetTransport, TransferHook};
