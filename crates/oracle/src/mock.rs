//! Mock Oracle for testing
//!
//! Provides configurable fixed prices for testing valuations.

use async_trait::async_trait;
use lendbank_core::{parse_units, AssetId, BASE_DECIMALS};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::error::OracleError;
use crate::types::{Price, PriceOracle};

/// Mock Price Oracle
///
/// Stores fixed prices that can be updated programmatically.
/// Useful for unit tests, integration tests and the sandbox CLI.
#[derive(Default)]
pub struct MockOracle {
    /// Stored prices (asset -> price)
    prices: RwLock<HashMap<AssetId, Price>>,
}

impl MockOracle {
    /// Create a new empty mock oracle
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild an oracle from previously exported prices
    pub fn from_prices(prices: impl IntoIterator<Item = Price>) -> Self {
        let prices = prices
            .into_iter()
            .map(|p| (p.asset.clone(), p))
            .collect();
        Self {
            prices: RwLock::new(prices),
        }
    }

    /// Set a fixed price in base-currency wei per whole token
    pub fn set_price(&self, asset: AssetId, wei_per_token: u128) -> Result<(), OracleError> {
        if wei_per_token == 0 {
            return Err(OracleError::InvalidPrice {
                asset,
                reason: "price must be positive".to_string(),
            });
        }

        let price = Price::new(asset.clone(), wei_per_token, "mock");
        let mut prices = self.prices.write().unwrap_or_else(PoisonError::into_inner);
        prices.insert(asset, price);
        Ok(())
    }

    /// Set a price given in whole base-currency units (e.g. `0.1`)
    pub fn set_price_decimal(&self, asset: AssetId, price: Decimal) -> Result<(), OracleError> {
        let wei = parse_units(price, BASE_DECIMALS).map_err(|e| OracleError::InvalidPrice {
            asset: asset.clone(),
            reason: e.to_string(),
        })?;
        self.set_price(asset, wei)
    }

    /// Remove a price (for testing the unset-price path)
    pub fn remove_price(&self, asset: &AssetId) {
        let mut prices = self.prices.write().unwrap_or_else(PoisonError::into_inner);
        prices.remove(asset);
    }

    /// Export all prices, ordered by asset code
    pub fn prices(&self) -> Vec<Price> {
        let prices = self.prices.read().unwrap_or_else(PoisonError::into_inner);
        let mut all: Vec<Price> = prices.values().cloned().collect();
        all.sort_by(|a, b| a.asset.cmp(&b.asset));
        all
    }
}

#[async_trait]
impl PriceOracle for MockOracle {
    async fn get_price(&self, asset: &AssetId) -> Result<Price, OracleError> {
        let prices = self.prices.read().unwrap_or_else(PoisonError::into_inner);
        prices
            .get(asset)
            .cloned()
            .ok_or_else(|| OracleError::PriceUnset {
                asset: asset.clone(),
            })
    }

    async fn supported_assets(&self) -> Vec<AssetId> {
        self.prices().into_iter().map(|p| p.asset).collect()
    }
}
