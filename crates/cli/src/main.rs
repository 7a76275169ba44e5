//! LendBank CLI - Main entry point

use clap::{Parser, Subcommand};
use lendbank_cli::{commands, AppContext};
use rust_decimal::Decimal;
use std::path::PathBuf;
use tracing::Instrument;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "lendbank")]
#[command(about = "LendBank - collateralized lending sandbox", long_about = None)]
struct Cli {
    /// Data directory path
    #[arg(short, long, default_value = "./data")]
    data: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new sandbox
    Init {
        /// Pool owner (will be uppercased)
        #[arg(long)]
        owner: String,
    },

    // === Administration ===

    /// Add or update a collateral asset
    Configure {
        /// Caller (must be the owner)
        caller: String,
        /// Asset code
        asset: String,
        /// Decimal precision of the asset
        #[arg(long, default_value = "18")]
        decimals: u8,
        /// Max loan-to-value in basis points
        #[arg(long)]
        max_ltv: u16,
        /// Liquidation threshold in basis points
        #[arg(long)]
        liquidation: u16,
    },

    /// Stop accepting new positions for an asset
    Deactivate {
        caller: String,
        asset: String,
    },

    /// Pause new borrowing
    Pause { caller: String },

    /// Resume new borrowing
    Unpause { caller: String },

    /// Transfer administrative control
    TransferOwner {
        caller: String,
        new_owner: String,
    },

    /// Seed lendable liquidity from the caller's balance
    Seed {
        caller: String,
        /// Base-currency amount
        amount: Decimal,
    },

    // === Sandbox collaborators ===

    /// Set the price of one whole token in base currency
    SetPrice {
        asset: String,
        price: Decimal,
    },

    /// Credit a sandbox bank balance
    Mint {
        account: String,
        amount: Decimal,
        /// Collateral asset (base currency if omitted)
        #[arg(long)]
        asset: Option<String>,
    },

    /// Show sandbox bank balances
    Balance { account: String },

    /// Advance the sandbox clock
    Warp {
        /// Seconds to advance
        #[arg(long)]
        secs: u64,
    },

    // === Positions ===

    /// Deposit collateral into a new position
    Open {
        user: String,
        asset: String,
        /// Collateral amount
        collateral: Decimal,
        /// Amount to borrow immediately
        #[arg(long, default_value = "0")]
        borrow: Decimal,
    },

    /// Borrow more against a position
    Borrow {
        user: String,
        position: usize,
        amount: Decimal,
    },

    /// Repay a position in full
    Repay {
        user: String,
        position: usize,
        /// Payment attached (excess is refunded)
        payment: Decimal,
    },

    /// Liquidate an unhealthy position
    Liquidate {
        liquidator: String,
        user: String,
        position: usize,
        /// Payment attached (excess is refunded)
        payment: Decimal,
    },

    // === Queries ===

    /// Show position health
    Health { user: String, position: usize },

    /// List a user's positions
    Positions { user: String },

    /// List collateral assets
    Assets,

    /// Show pool counters
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lendbank=info,lendbank_lending=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let request_id = Uuid::new_v4();

    run(cli)
        .instrument(tracing::info_span!("command", %request_id))
        .await
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Commands::Init { owner } = &cli.command {
        let ctx = AppContext::init(&cli.data, owner.parse()?)?;
        println!(
            "✅ Sandbox initialized at {} (owner {})",
            ctx.data_path().display(),
            ctx.pool.owner()
        );
        return Ok(());
    }

    let ctx = AppContext::load(&cli.data)?;
    dispatch(&ctx, cli.command).await?;
    ctx.save()
}

async fn dispatch(ctx: &AppContext, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Init { .. } => {
            anyhow::bail!("Sandbox already initialized at {}", ctx.data_path().display());
        }

        Commands::Configure {
            caller,
            asset,
            decimals,
            max_ltv,
            liquidation,
        } => {
            commands::configure(ctx, &caller, &asset, decimals, max_ltv, liquidation)?;
        }

        Commands::Deactivate { caller, asset } => {
            commands::deactivate(ctx, &caller, &asset)?;
        }

        Commands::Pause { caller } => {
            commands::set_paused(ctx, &caller, true)?;
        }

        Commands::Unpause { caller } => {
            commands::set_paused(ctx, &caller, false)?;
        }

        Commands::TransferOwner { caller, new_owner } => {
            commands::transfer_ownership(ctx, &caller, &new_owner)?;
        }

        Commands::Seed { caller, amount } => {
            commands::seed(ctx, &caller, amount).await?;
        }

        Commands::SetPrice { asset, price } => {
            commands::set_price(ctx, &asset, price)?;
        }

        Commands::Mint {
            account,
            amount,
            asset,
        } => {
            commands::mint(ctx, &account, amount, asset.as_deref())?;
        }

        Commands::Balance { account } => {
            commands::balance(ctx, &account)?;
        }

        Commands::Warp { secs } => {
            commands::warp(ctx, secs)?;
        }

        Commands::Open {
            user,
            asset,
            collateral,
            borrow,
        } => {
            commands::open(ctx, &user, &asset, collateral, borrow).await?;
        }

        Commands::Borrow {
            user,
            position,
            amount,
        } => {
            commands::borrow(ctx, &user, position, amount).await?;
        }

        Commands::Repay {
            user,
            position,
            payment,
        } => {
            commands::repay(ctx, &user, position, payment).await?;
        }

        Commands::Liquidate {
            liquidator,
            user,
            position,
            payment,
        } => {
            commands::liquidate(ctx, &liquidator, &user, position, payment).await?;
        }

        Commands::Health { user, position } => {
            commands::health(ctx, &user, position).await?;
        }

        Commands::Positions { user } => {
            commands::positions(ctx, &user)?;
        }

        Commands::Assets => {
            commands::assets(ctx)?;
        }

        Commands::Stats => {
            commands::stats(ctx)?;
        }
    }

    Ok(())
}
