//! LendBank Core - Domain types
//!
//! This crate contains the fundamental types used across LendBank:
//! - `AccountId`: Identity of a user, liquidator, operator or the pool itself
//! - `AssetId`: Type-safe code of a collateral asset
//! - `units`: Conversion between human decimal amounts and integer base units

pub mod account;
pub mod asset;
pub mod units;

pub use account::{AccountId, AccountIdError};
pub use asset::{AssetId, AssetIdError};
pub use units::{format_units, parse_units, UnitsError, BASE_DECIMALS};
