//! Lending configuration
//!
//! Rates are configurable via file/env, not hardcoded.
//! Protocol limits (the 95% liquidation cap, the fixed year length) are
//! constants and cannot be overridden.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Environment variable overriding `annual_rate_bps`
pub const ENV_ANNUAL_RATE_BPS: &str = "LENDBANK_ANNUAL_RATE_BPS";

/// Environment variable overriding `liquidation_bonus_bps`
pub const ENV_LIQUIDATION_BONUS_BPS: &str = "LENDBANK_LIQUIDATION_BONUS_BPS";

/// Errors loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value for {var}: {value}")]
    InvalidEnv { var: &'static str, value: String },
}

/// Configuration for the lending pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LendingConfig {
    /// Annual borrow rate in basis points (500 = 5% APR), simple interest
    #[serde(default = "default_annual_rate_bps")]
    pub annual_rate_bps: u16,

    /// Liquidation bonus in basis points
    ///
    /// Not applied: a liquidator always receives the whole collateral of the
    /// position. Kept so operators can see the configured value.
    #[serde(default)]
    pub liquidation_bonus_bps: u16,
}

fn default_annual_rate_bps() -> u16 {
    500
}

impl Default for LendingConfig {
    fn default() -> Self {
        Self {
            annual_rate_bps: default_annual_rate_bps(),
            liquidation_bonus_bps: 0,
        }
    }
}

impl LendingConfig {
    /// Load configuration from JSON file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Apply `LENDBANK_*` environment overrides on top of this config
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|var| std::env::var(var).ok())
    }

    fn with_overrides(
        mut self,
        lookup: impl Fn(&'static str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(rate) = parse_bps(ENV_ANNUAL_RATE_BPS, &lookup)? {
            self.annual_rate_bps = rate;
        }
        if let Some(bonus) = parse_bps(ENV_LIQUIDATION_BONUS_BPS, &lookup)? {
            self.liquidation_bonus_bps = bonus;
        }
        Ok(self)
    }
}

fn parse_bps(
    var: &'static str,
    lookup: &impl Fn(&'static str) -> Option<String>,
) -> Result<Option<u16>, ConfigError> {
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv { var, value }),
    }
}
