//! LendBank Lending - collateralized lending ledger
//!
//! Users lock a priced asset as collateral and borrow base currency against
//! it. Debt accrues simple interest; a position whose debt reaches its
//! liquidation threshold can be closed by anyone who repays it.
//!
//! ```text
//!            ┌──────────────────┐      ┌──────────────────┐
//! caller ──► │ LendingPool      │ ───► │ PriceOracle      │
//!            │  guard (1 op)    │      └──────────────────┘
//!            │  ┌────────────┐  │
//!            │  │ registry   │  │      ┌──────────────────┐
//!            │  │ positions  │  │ ───► │ AssetTransport   │
//!            │  │ liquidity  │  │      │  (may call back) │
//!            │  └────────────┘  │      └──────────────────┘
//!            └──────────────────┘
//! ```
//!
//! Amounts are `u128`: collateral in the asset's native units, debt and
//! liquidity in base-currency wei (18 decimals). All divisions round down.

pub mod auth;
pub mod borrow;
pub mod clock;
pub mod config;
pub mod error;
pub mod guard;
pub mod health;
pub mod interest;
pub mod liquidation;
mod math;
pub mod pool;
pub mod position;
pub mod registry;
pub mod state;

pub use auth::Ownership;
pub use borrow::{BorrowReceipt, OpenReceipt, RepayReceipt};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, LendingConfig};
pub use error::{LendingError, LendingResult};
pub use guard::{GuardToken, ReentrancyGuard};
pub use health::{PositionHealth, HEALTH_FACTOR_MAX};
pub use interest::{InterestModel, DEFAULT_ANNUAL_RATE_BPS};
pub use liquidation::LiquidationOutcome;
pub use math::{BPS_DENOMINATOR, SECONDS_PER_YEAR};
pub use pool::LendingPool;
pub use position::{Position, PositionId, PositionLedger};
pub use registry::{CollateralConfig, CollateralRegistry, MAX_DECIMALS, MAX_LIQUIDATION_BPS};
pub use state::{LedgerStats, PoolState, PoolStats};
