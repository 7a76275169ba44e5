//! CLI commands
//!
//! Amounts are human decimals: base-currency amounts use 18 decimals,
//! collateral amounts use the asset's configured precision.

use lendbank_core::{format_units, parse_units, AccountId, AssetId, BASE_DECIMALS};
use lendbank_lending::{PositionId, HEALTH_FACTOR_MAX};
use lendbank_transport::Holding;
use rust_decimal::Decimal;

use crate::context::AppContext;

fn account(id: &str) -> Result<AccountId, anyhow::Error> {
    Ok(id.parse()?)
}

fn asset(code: &str) -> Result<AssetId, anyhow::Error> {
    Ok(code.parse()?)
}

fn base_units(amount: Decimal) -> Result<u128, anyhow::Error> {
    Ok(parse_units(amount, BASE_DECIMALS)?)
}

fn base(amount: u128) -> String {
    format_units(amount, BASE_DECIMALS)
}

/// Collateral units of a configured asset, with its decimals
fn collateral_units(
    ctx: &AppContext,
    asset: &AssetId,
    amount: Decimal,
) -> Result<(u128, u8), anyhow::Error> {
    let decimals = ctx.pool.collateral_config(asset)?.decimals;
    Ok((parse_units(amount, decimals)?, decimals))
}

/// Add or update a collateral asset
pub fn configure(
    ctx: &AppContext,
    caller: &str,
    asset_code: &str,
    decimals: u8,
    max_ltv_bps: u16,
    liquidation_bps: u16,
) -> Result<(), anyhow::Error> {
    let config = ctx.pool.configure_collateral(
        &account(caller)?,
        asset(asset_code)?,
        decimals,
        max_ltv_bps,
        liquidation_bps,
    )?;

    println!(
        "✅ Configured {} (decimals {}, max LTV {} bps, liquidation {} bps)",
        asset_code.to_uppercase(),
        config.decimals,
        config.max_ltv_bps,
        config.liquidation_bps
    );
    Ok(())
}

/// Stop accepting new positions for an asset
pub fn deactivate(ctx: &AppContext, caller: &str, asset_code: &str) -> Result<(), anyhow::Error> {
    ctx.pool
        .deactivate_collateral(&account(caller)?, &asset(asset_code)?)?;

    println!("✅ Deactivated {}", asset_code.to_uppercase());
    Ok(())
}

/// Set or clear the pause flag
pub fn set_paused(ctx: &AppContext, caller: &str, paused: bool) -> Result<(), anyhow::Error> {
    ctx.pool.set_paused(&account(caller)?, paused)?;

    if paused {
        println!("⏸️  Pool paused");
    } else {
        println!("▶️  Pool resumed");
    }
    Ok(())
}

/// Hand administrative control to another account
pub fn transfer_ownership(
    ctx: &AppContext,
    caller: &str,
    new_owner: &str,
) -> Result<(), anyhow::Error> {
    let new_owner = account(new_owner)?;
    ctx.pool
        .transfer_ownership(&account(caller)?, new_owner.clone())?;

    println!("✅ Ownership transferred to {}", new_owner);
    Ok(())
}

/// Seed lendable liquidity from the caller's base-currency balance
pub async fn seed(ctx: &AppContext, caller: &str, amount: Decimal) -> Result<(), anyhow::Error> {
    let liquidity = ctx
        .pool
        .seed_liquidity(&account(caller)?, base_units(amount)?)
        .await?;

    println!(
        "✅ Seeded {} (available liquidity: {})",
        amount,
        base(liquidity)
    );
    Ok(())
}

/// Set the oracle price of one whole token, in base currency
pub fn set_price(ctx: &AppContext, asset_code: &str, price: Decimal) -> Result<(), anyhow::Error> {
    ctx.oracle.set_price_decimal(asset(asset_code)?, price)?;

    println!("✅ Price of {} set to {}", asset_code.to_uppercase(), price);
    Ok(())
}

/// Credit sandbox bank balances
///
/// Without an asset the base currency is minted.
pub fn mint(
    ctx: &AppContext,
    account_id: &str,
    amount: Decimal,
    asset_code: Option<&str>,
) -> Result<(), anyhow::Error> {
    let account_id = account(account_id)?;

    let (holding, units) = match asset_code {
        Some(code) => {
            let asset = asset(code)?;
            let (units, _) = collateral_units(ctx, &asset, amount)?;
            (Holding::Asset(asset), units)
        }
        None => (Holding::Native, base_units(amount)?),
    };
    ctx.bank.mint(&account_id, holding.clone(), units)?;

    println!("✅ Minted {} {} to {}", amount, holding, account_id);
    Ok(())
}

/// Show the sandbox bank balances of an account
pub fn balance(ctx: &AppContext, account_id: &str) -> Result<(), anyhow::Error> {
    let account_id = account(account_id)?;
    let snapshot = ctx.bank.snapshot();

    println!("Balances for {}:", account_id);
    let mut any = false;
    for record in snapshot.balances.iter().filter(|r| r.account == account_id) {
        let decimals = match &record.holding {
            Holding::Native => BASE_DECIMALS,
            Holding::Asset(asset) => ctx
                .pool
                .collateral_config(asset)
                .map(|c| c.decimals)
                .unwrap_or(0),
        };
        println!(
            "  {:<8} {}",
            record.holding.to_string(),
            format_units(record.amount, decimals)
        );
        any = true;
    }
    if !any {
        println!("  (empty)");
    }
    Ok(())
}

/// Deposit collateral into a new position, optionally borrowing
pub async fn open(
    ctx: &AppContext,
    user: &str,
    asset_code: &str,
    collateral: Decimal,
    borrow: Decimal,
) -> Result<(), anyhow::Error> {
    let asset = asset(asset_code)?;
    let (collateral_units, _) = collateral_units(ctx, &asset, collateral)?;

    let receipt = ctx
        .pool
        .open_position(&account(user)?, &asset, collateral_units, base_units(borrow)?)
        .await?;

    println!(
        "✅ Opened position #{} for {}: {} {} deposited, {} borrowed",
        receipt.position_id,
        user.to_uppercase(),
        collateral,
        asset,
        base(receipt.borrowed)
    );
    Ok(())
}

/// Borrow more against an open position
pub async fn borrow(
    ctx: &AppContext,
    user: &str,
    position_id: PositionId,
    amount: Decimal,
) -> Result<(), anyhow::Error> {
    let receipt = ctx
        .pool
        .borrow_more(&account(user)?, position_id, base_units(amount)?)
        .await?;

    println!(
        "✅ Borrowed {} against #{} (interest capitalized: {}, debt: {})",
        base(receipt.borrowed),
        position_id,
        base(receipt.interest_capitalized),
        base(receipt.debt)
    );
    Ok(())
}

/// Repay a position in full
pub async fn repay(
    ctx: &AppContext,
    user: &str,
    position_id: PositionId,
    payment: Decimal,
) -> Result<(), anyhow::Error> {
    let user = account(user)?;
    let asset = ctx.pool.position(&user, position_id)?.collateral_asset;
    let decimals = ctx.pool.collateral_config(&asset)?.decimals;

    let receipt = ctx
        .pool
        .repay(&user, position_id, base_units(payment)?)
        .await?;

    println!(
        "✅ Repaid #{} (owed {}, interest {}, refund {}); returned {} {}",
        position_id,
        base(receipt.owed),
        base(receipt.interest),
        base(receipt.refund),
        format_units(receipt.collateral_returned, decimals),
        asset
    );
    Ok(())
}

/// Liquidate an unhealthy position
pub async fn liquidate(
    ctx: &AppContext,
    liquidator: &str,
    user: &str,
    position_id: PositionId,
    payment: Decimal,
) -> Result<(), anyhow::Error> {
    let outcome = ctx
        .pool
        .liquidate(
            &account(liquidator)?,
            &account(user)?,
            position_id,
            base_units(payment)?,
        )
        .await?;
    let decimals = ctx.pool.collateral_config(&outcome.collateral_asset)?.decimals;

    println!(
        "✅ Liquidated {} #{}: seized {} {} (value {}) for debt {}, refund {}",
        outcome.user,
        position_id,
        format_units(outcome.collateral_seized, decimals),
        outcome.collateral_asset,
        base(outcome.collateral_value),
        base(outcome.total_debt),
        base(outcome.refund)
    );
    Ok(())
}

/// Show the health of a position
pub async fn health(ctx: &AppContext, user: &str, position_id: PositionId) -> Result<(), anyhow::Error> {
    let health = ctx.pool.position_health(&account(user)?, position_id).await?;

    let factor = if health.health_factor == HEALTH_FACTOR_MAX {
        "∞".to_string()
    } else {
        format_units(health.health_factor, 4)
    };

    println!("Position {} #{}:", user.to_uppercase(), position_id);
    println!("  Collateral value: {}", base(health.collateral_value));
    println!("  Total debt:       {}", base(health.total_debt));
    println!("  Threshold:        {}", base(health.threshold));
    println!("  Health factor:    {}", factor);
    if health.liquidatable {
        println!("  ⚠️  LIQUIDATABLE");
    }
    Ok(())
}

/// List every slot of a user
pub fn positions(ctx: &AppContext, user: &str) -> Result<(), anyhow::Error> {
    let user = account(user)?;
    let positions = ctx.pool.positions(&user);

    if positions.is_empty() {
        println!("No positions for {}", user);
        return Ok(());
    }

    println!("Positions for {} ({}):", user, positions.len());
    println!("{:-<72}", "");
    for (id, position) in positions.iter().enumerate() {
        if position.is_closed() {
            println!("  #{:<3} closed", id);
            continue;
        }
        let decimals = ctx
            .pool
            .collateral_config(&position.collateral_asset)?
            .decimals;
        println!(
            "  #{:<3} {} {} | debt {} | accrued since {}",
            id,
            format_units(position.collateral_amount, decimals),
            position.collateral_asset,
            base(position.debt),
            position.last_accrual
        );
    }
    Ok(())
}

/// List configured collateral assets
pub fn assets(ctx: &AppContext) -> Result<(), anyhow::Error> {
    let assets = ctx.pool.supported_assets();

    if assets.is_empty() {
        println!("No collateral assets configured");
        return Ok(());
    }

    println!(
        "{:<10} {:>8} {:>8} {:>8} {:>8}",
        "ASSET", "ACTIVE", "DEC", "LTV", "LIQ"
    );
    for (asset, config) in assets {
        println!(
            "{:<10} {:>8} {:>8} {:>8} {:>8}",
            asset.code(),
            config.active,
            config.decimals,
            config.max_ltv_bps,
            config.liquidation_bps
        );
    }
    Ok(())
}

/// Show pool-wide counters
pub fn stats(ctx: &AppContext) -> Result<(), anyhow::Error> {
    let stats = ctx.pool.stats();
    let config = ctx.pool.config();

    println!("Owner:               {}", stats.owner);
    println!("Paused:              {}", stats.paused);
    println!("Annual rate:         {} bps", config.annual_rate_bps);
    println!("Available liquidity: {}", base(stats.available_liquidity));
    println!("Total borrowed:      {}", base(stats.ledger.total_borrowed));
    println!("Total liquidated:    {}", base(stats.ledger.total_liquidated));
    println!(
        "Interest collected:  {}",
        base(stats.ledger.total_interest_collected)
    );
    Ok(())
}

/// Advance the sandbox clock
pub fn warp(ctx: &AppContext, secs: u64) -> Result<(), anyhow::Error> {
    let now = ctx.clock.advance(secs);

    println!("⏩ Advanced {} seconds (now {})", secs, now);
    Ok(())
}
