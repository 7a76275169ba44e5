//! Application context - loads and saves the sandbox

use anyhow::{bail, Context};
use lendbank_core::AccountId;
use lendbank_lending::{Clock, LendingConfig, LendingPool, ManualClock, PoolState, SystemClock};
use lendbank_oracle::{MockOracle, Price};
use lendbank_transport::{BankSnapshot, InMemoryBank};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const POOL_FILE: &str = "pool.json";
const BANK_FILE: &str = "bank.json";
const ORACLE_FILE: &str = "oracle.json";
const CLOCK_FILE: &str = "clock.json";
const CONFIG_FILE: &str = "config.json";

/// Persisted sandbox time
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct ClockFile {
    now: u64,
}

/// Application context - wires the pool to its sandbox collaborators
pub struct AppContext {
    pub pool: LendingPool,
    pub bank: Arc<InMemoryBank>,
    pub oracle: Arc<MockOracle>,
    pub clock: Arc<ManualClock>,
    data_path: PathBuf,
}

impl AppContext {
    /// Create a fresh sandbox owned by `owner`
    ///
    /// The sandbox clock starts at the current wall-clock time.
    pub fn init(data_path: impl AsRef<Path>, owner: AccountId) -> Result<Self, anyhow::Error> {
        let data_path = data_path.as_ref();
        if Self::is_initialized(data_path) {
            bail!("Sandbox already initialized at {}", data_path.display());
        }
        std::fs::create_dir_all(data_path)?;

        let config = load_config(data_path)?;
        let ctx = Self::assemble(
            data_path,
            PoolState::new(owner),
            config,
            InMemoryBank::new(),
            MockOracle::new(),
            SystemClock.now(),
        );
        ctx.save()?;
        Ok(ctx)
    }

    /// Load an existing sandbox
    pub fn load(data_path: impl AsRef<Path>) -> Result<Self, anyhow::Error> {
        let data_path = data_path.as_ref();
        if !Self::is_initialized(data_path) {
            bail!(
                "No sandbox at {} (run `lendbank init` first)",
                data_path.display()
            );
        }

        let state: PoolState = read_json(&data_path.join(POOL_FILE))?;
        let bank: BankSnapshot = read_json(&data_path.join(BANK_FILE))?;
        let prices: Vec<Price> = read_json(&data_path.join(ORACLE_FILE))?;
        let clock: ClockFile = read_json(&data_path.join(CLOCK_FILE))?;
        let config = load_config(data_path)?;

        Ok(Self::assemble(
            data_path,
            state,
            config,
            InMemoryBank::from_snapshot(bank),
            MockOracle::from_prices(prices),
            clock.now,
        ))
    }

    fn assemble(
        data_path: &Path,
        state: PoolState,
        config: LendingConfig,
        bank: InMemoryBank,
        oracle: MockOracle,
        now: u64,
    ) -> Self {
        let bank = Arc::new(bank);
        let oracle = Arc::new(oracle);
        let clock = Arc::new(ManualClock::new(now));

        let pool = LendingPool::from_state(state, config, oracle.clone(), bank.clone())
            .with_clock(clock.clone());

        Self {
            pool,
            bank,
            oracle,
            clock,
            data_path: data_path.to_path_buf(),
        }
    }

    /// Write every sandbox file back to the data directory
    pub fn save(&self) -> Result<(), anyhow::Error> {
        write_json(&self.data_path.join(POOL_FILE), &self.pool.snapshot())?;
        write_json(&self.data_path.join(BANK_FILE), &self.bank.snapshot())?;
        write_json(&self.data_path.join(ORACLE_FILE), &self.oracle.prices())?;
        write_json(
            &self.data_path.join(CLOCK_FILE),
            &ClockFile {
                now: self.clock.now(),
            },
        )?;

        tracing::debug!(path = %self.data_path.display(), "Sandbox saved");
        Ok(())
    }

    /// Check if a sandbox exists at `data_path`
    pub fn is_initialized(data_path: impl AsRef<Path>) -> bool {
        data_path.as_ref().join(POOL_FILE).exists()
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }
}

/// `config.json` if present, else defaults; environment overrides on top
fn load_config(data_path: &Path) -> Result<LendingConfig, anyhow::Error> {
    let path = data_path.join(CONFIG_FILE);
    let config = if path.exists() {
        LendingConfig::from_file(&path)
            .with_context(|| format!("Failed to load {}", path.display()))?
    } else {
        LendingConfig::default()
    };
    Ok(config.with_env_overrides()?)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, anyhow::Error> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), anyhow::Error> {
    let content = serde_json::to_string_pretty(value)?;
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}
