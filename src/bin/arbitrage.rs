//! Scan Coinex markets for triangular arbitrage.
//!
//! Run with: cargo run --bin arbitrage [-- --all]
//!
//! Only public market data is read, so no credentials are needed.

use anyhow::{Context, Result};
use clap::Parser;
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use tracing::info;

use ::coinex_tools::arbitrage::{
    find_chains, profitable_chains, score_chains, TRANSACTION_FEE,
};
use ::coinex_tools::market_data::{MarketSnapshot, OrderBooks};
use ::coinex_tools::trading_apis::CoinexClient;

#[derive(Debug, Parser)]
#[command(about = "Look for profitable three-market cycles on Coinex")]
struct Args {
    /// Print every chain, profitable or not
    #[arg(long)]
    all: bool,

    /// Fee charged per trade, as a fraction
    #[arg(long, default_value_t = TRANSACTION_FEE)]
    fee: Decimal,
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

    let client = CoinexClient::public()?;
    let snapshot = MarketSnapshot::load(&client)
        .await
        .context("Failed to load markets")?;

    let chains = find_chains(&snapshot.markets);
    if args.all {
        println!("-------Getting All Chains-------");
    } else {
        println!("-------Getting Profitable Chains-------");
    }

    // Each book is fetched once no matter how many chains use it
    let market_ids: BTreeSet<u64> = chains
        .iter()
        .flat_map(|c| c.markets.iter().map(|m| m.id))
        .collect();
    info!(
        "{} chains over {} markets, fetching order books",
        chains.len(),
        market_ids.len()
    );
    let mut books = OrderBooks::new();
    books
        .fetch_all(&client, market_ids)
        .await
        .context("Failed to get order books")?;

    let found = if args.all {
        score_chains(chains, &books, args.fee)
    } else {
        profitable_chains(chains, &books, args.fee)
    };

    for chain in &found {
        println!("{}", chain);
    }
    println!("Found {} arbitrage chains", found.len());

    Ok(())
}
