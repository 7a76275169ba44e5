//! Collateral Registry - per-asset risk parameters
//!
//! Configs are never deleted, only deactivated, so positions opened against
//! an asset stay evaluable and closable after the asset stops accepting new
//! positions.

use lendbank_core::AssetId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{LendingError, LendingResult};

/// Highest allowed liquidation threshold (95%)
pub const MAX_LIQUIDATION_BPS: u16 = 9_500;

/// Highest supported token precision; keeps `10^decimals` and valuations in range
pub const MAX_DECIMALS: u8 = 36;

/// Risk parameters of one collateral asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollateralConfig {
    /// Accepts new positions
    pub active: bool,
    /// Decimal precision of the asset's native units
    pub decimals: u8,
    /// Max loan-to-value at borrow time, in bps
    pub max_ltv_bps: u16,
    /// Loan-to-value at or above which a position is liquidatable, in bps
    pub liquidation_bps: u16,
}

impl CollateralConfig {
    /// Check `max_ltv_bps < liquidation_bps <= 9500`
    pub fn new(decimals: u8, max_ltv_bps: u16, liquidation_bps: u16) -> LendingResult<Self> {
        if max_ltv_bps >= liquidation_bps {
            return Err(LendingError::invalid(format!(
                "max LTV {} bps must be below liquidation threshold {} bps",
                max_ltv_bps, liquidation_bps
            )));
        }
        if liquidation_bps > MAX_LIQUIDATION_BPS {
            return Err(LendingError::invalid(format!(
                "liquidation threshold {} bps exceeds cap {} bps",
                liquidation_bps, MAX_LIQUIDATION_BPS
            )));
        }
        if decimals > MAX_DECIMALS {
            return Err(LendingError::invalid(format!(
                "decimals {} exceeds {}",
                decimals, MAX_DECIMALS
            )));
        }

        Ok(Self {
            active: true,
            decimals,
            max_ltv_bps,
            liquidation_bps,
        })
    }
}

/// Registry of every collateral asset ever configured
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollateralRegistry {
    configs: BTreeMap<AssetId, CollateralConfig>,
    /// First-configured order, deduplicated
    listed: Vec<AssetId>,
}

impl CollateralRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or update an asset; re-configuring also re-activates it
    pub fn configure(
        &mut self,
        asset: AssetId,
        decimals: u8,
        max_ltv_bps: u16,
        liquidation_bps: u16,
    ) -> LendingResult<CollateralConfig> {
        let config = CollateralConfig::new(decimals, max_ltv_bps, liquidation_bps)?;

        if self.configs.insert(asset.clone(), config).is_none() {
            self.listed.push(asset);
        }

        Ok(config)
    }

    /// Stop accepting new positions for `asset`
    pub fn deactivate(&mut self, asset: &AssetId) -> LendingResult<()> {
        let config = self
            .configs
            .get_mut(asset)
            .ok_or_else(|| LendingError::AssetNotSupported {
                asset: asset.clone(),
            })?;
        config.active = false;
        Ok(())
    }

    /// Config of a known asset, active or not
    pub fn get(&self, asset: &AssetId) -> LendingResult<CollateralConfig> {
        self.configs
            .get(asset)
            .copied()
            .ok_or_else(|| LendingError::AssetNotSupported {
                asset: asset.clone(),
            })
    }

    /// Config of an asset that accepts new positions
    pub fn get_active(&self, asset: &AssetId) -> LendingResult<CollateralConfig> {
        let config = self.get(asset)?;
        if !config.active {
            return Err(LendingError::AssetNotSupported {
                asset: asset.clone(),
            });
        }
        Ok(config)
    }

    /// Every configured asset in first-configured order
    pub fn assets(&self) -> Vec<(AssetId, CollateralConfig)> {
        self.listed
            .iter()
            .filter_map(|asset| self.configs.get(asset).map(|c| (asset.clone(), *c)))
            .collect()
    }
}
