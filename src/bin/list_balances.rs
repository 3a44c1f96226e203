//! List every Coinex balance that holds something.
//!
//! Run with: cargo run --bin list_balances
//!
//! Prints `<CUR> <available + held> (<held> held)` per currency.

use anyhow::{Context, Result};
use clap::Parser;
use rust_decimal::Decimal;
use std::path::PathBuf;
use tracing::info;

use ::coinex_tools::auth::CoinexAuth;
use ::coinex_tools::market_data::MarketSnapshot;
use ::coinex_tools::trading_apis::CoinexClient;

#[derive(Debug, Parser)]
#[command(about = "List non-empty Coinex balances")]
struct Args {
    /// dotenv-style file with COINEX_API_KEY and COINEX_API_SECRET
    #[arg(long)]
    credentials: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("coinex_tools=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = Args::parse();

    let auth = CoinexAuth::load(args.credentials.as_deref())
        .context("Failed to load Coinex credentials")?;
    let client = CoinexClient::new(auth)?;

    let snapshot = MarketSnapshot::load(&client)
        .await
        .context("Failed to load currencies")?;
    let balances = snapshot
        .balances(&client)
        .await
        .context("Failed to get balances")?;
    info!("Fetched {} balances", balances.len());

    for balance in balances.iter().filter(|b| b.total() > Decimal::ZERO) {
        println!(
            "{} {} ({} held)",
            balance.currency.abbreviation,
            balance.total(),
            balance.held
        );
    }

    Ok(())
}
