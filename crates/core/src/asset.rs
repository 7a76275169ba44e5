//! AssetId - Type-safe collateral asset codes

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur when parsing asset codes
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssetIdError {
    #[error("Empty asset code")]
    EmptyCode,

    #[error("Asset code too long (max 16 chars): {0}")]
    TooLong(String),

    #[error("Invalid asset code format: {0}")]
    InvalidFormat(String),
}

/// Code of a collateral asset (e.g. `WETH`, `WBTC`)
///
/// The base currency is not an `AssetId`; it is addressed through the
/// native movements of the transport layer.
///
/// # Example
/// ```
/// use lendbank_core::AssetId;
///
/// let weth: AssetId = "weth".parse().unwrap();
/// assert_eq!(weth.to_string(), "WETH");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssetId(String);

impl AssetId {
    pub fn code(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AssetId {
    type Err = AssetIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_uppercase();

        if s.is_empty() {
            return Err(AssetIdError::EmptyCode);
        }

        if s.len() > 16 {
            return Err(AssetIdError::TooLong(s));
        }

        // Validate: only alphanumeric
        if !s.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(AssetIdError::InvalidFormat(s));
        }

        Ok(Self(s))
    }
}

impl TryFrom<String> for AssetId {
    type Error = AssetIdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<AssetId> for String {
    fn from(asset: AssetId) -> Self {
        asset.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_parse() {
        let asset: AssetId = "wbtc".parse().unwrap();
        assert_eq!(asset.code(), "WBTC");
    }

    #[test]
    fn test_asset_empty() {
        assert_eq!("".parse::<AssetId>(), Err(AssetIdError::EmptyCode));
    }

    #[test]
    fn test_asset_too_long() {
        let result = "ABCDEFGHIJKLMNOPQ".parse::<AssetId>();
        assert!(matches!(result, Err(AssetIdError::TooLong(_))));
    }

    #[test]
    fn test_asset_invalid_format() {
        let result = "W-ETH".parse::<AssetId>();
        assert!(matches!(result, Err(AssetIdError::InvalidFormat(_))));
    }

    #[test]
    fn test_asset_serde() {
        let asset: AssetId = "WETH".parse().unwrap();
        let json = serde_json::to_string(&asset).unwrap();
        assert_eq!(json, "\"WETH\"");

        let parsed: AssetId = serde_json::from_str("\"weth\"").unwrap();
        assert_eq!(parsed, asset);
    }
}
