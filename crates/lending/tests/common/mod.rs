#![allow(dead_code)]

use lendbank_core::{AccountId, AssetId};
use lendbank_lending::{LendingConfig, LendingPool, ManualClock, Position};
use lendbank_oracle::MockOracle;
use lendbank_transport::{Holding, InMemoryBank};
use rust_decimal_macros::dec;
use std::sync::Arc;

pub const WAD: u128 = 1_000_000_000_000_000_000;
pub const START: u64 = 1_700_000_000;
pub const DAY: u64 = 86_400;
pub const YEAR: u64 = 365 * DAY;

pub struct Sandbox {
    pub pool: Arc<LendingPool>,
    pub bank: Arc<InMemoryBank>,
    pub oracle: Arc<MockOracle>,
    pub clock: Arc<ManualClock>,
}

pub fn account(id: &str) -> AccountId {
    id.parse().unwrap()
}

pub fn admin() -> AccountId {
    account("ADMIN")
}

pub fn alice() -> AccountId {
    account("ALICE")
}

pub fn bob() -> AccountId {
    account("BOB")
}

pub fn tok() -> AssetId {
    "TOK".parse().unwrap()
}

/// Pool with TOK (18 decimals, 75% LTV, 85% liquidation) priced at 0.1,
/// 1000 base seeded, and 1000 TOK in Alice's wallet
pub async fn sandbox() -> Sandbox {
    sandbox_with_liquidity(1_000 * WAD).await
}

pub async fn sandbox_with_liquidity(liquidity: u128) -> Sandbox {
    let bank = Arc::new(InMemoryBank::new());
    let oracle = Arc::new(MockOracle::new());
    let clock = Arc::new(ManualClock::new(START));

    let pool = LendingPool::new(
        admin(),
        LendingConfig::default(),
        oracle.clone(),
        bank.clone(),
    )
    .with_clock(clock.clone());

    pool.configure_collateral(&admin(), tok(), 18, 7_500, 8_500)
        .unwrap();
    oracle.set_price_decimal(tok(), dec!(0.1)).unwrap();

    if liquidity > 0 {
        bank.mint(&admin(), Holding::Native, liquidity).unwrap();
        pool.seed_liquidity(&admin(), liquidity).await.unwrap();
    }
    bank.mint(&alice(), Holding::Asset(tok()), 1_000 * WAD)
        .unwrap();

    Sandbox {
        pool: Arc::new(pool),
        bank,
        oracle,
        clock,
    }
}

impl Sandbox {
    pub fn native(&self, who: &AccountId) -> u128 {
        self.bank.balance(who, &Holding::Native)
    }

    pub fn tokens(&self, who: &AccountId) -> u128 {
        self.bank.balance(who, &Holding::Asset(tok()))
    }

    pub fn position(&self, who: &AccountId, id: usize) -> Position {
        self.pool.position(who, id).unwrap()
    }

    pub fn set_price(&self, price: rust_decimal::Decimal) {
        self.oracle.set_price_decimal(tok(), price).unwrap();
    }
}
