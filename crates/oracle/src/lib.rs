//! LendBank Price Oracle
//!
//! Answers "how much base currency is N units of asset A worth".
//! Currently implements MockOracle for tests and the sandbox CLI;
//! can be extended for external feeds.

mod error;
mod mock;
mod types;

pub use error::OracleError;
pub use mock::MockOracle;
pub use types::{quote, Price, PriceOracle};
