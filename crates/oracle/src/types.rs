//! Core oracle types

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lendbank_core::AssetId;
use serde::{Deserialize, Serialize};

use crate::OracleError;

/// A price quote for one whole token of a collateral asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// The priced asset
    pub asset: AssetId,
    /// Base-currency wei per one whole token (10^decimals native units)
    pub wei_per_token: u128,
    /// Timestamp when this price was set or fetched
    pub timestamp: DateTime<Utc>,
    /// Source of the price (e.g., "mock", "chainlink")
    pub source: String,
}

impl Price {
    pub fn new(asset: AssetId, wei_per_token: u128, source: impl Into<String>) -> Self {
        Self {
            asset,
            wei_per_token,
            timestamp: Utc::now(),
            source: source.into(),
        }
    }
}

/// Value `amount` native units at `wei_per_token`, rounding down.
///
/// `value = amount * wei_per_token / 10^decimals`
pub fn quote(
    asset: &AssetId,
    amount: u128,
    wei_per_token: u128,
    decimals: u8,
) -> Result<u128, OracleError> {
    let overflow = || OracleError::Overflow {
        asset: asset.clone(),
        amount,
    };

    let scale = 10u128
        .checked_pow(u32::from(decimals))
        .ok_or_else(overflow)?;

    amount
        .checked_mul(wei_per_token)
        .ok_or_else(overflow)
        .map(|gross| gross / scale)
}

/// Price Oracle trait - interface for price feeds
///
/// Implementations can be:
/// - MockOracle: For testing with fixed prices
/// - ChainlinkOracle: On-chain prices from Chainlink
#[async_trait]
pub trait PriceOracle: Send + Sync {
    /// Get the current price of one whole token
    async fn get_price(&self, asset: &AssetId) -> Result<Price, OracleError>;

    /// Base-currency value of `amount` native units of `asset`
    ///
    /// Fails with `PriceUnset` if the asset has never been priced.
    async fn value_of(
        &self,
        asset: &AssetId,
        amount: u128,
        decimals: u8,
    ) -> Result<u128, OracleError> {
        let price = self.get_price(asset).await?;
        quote(asset, amount, price.wei_per_token, decimals)
    }

    /// Get a list of all priced assets
    async fn supported_assets(&self) -> Vec<AssetId>;
}
