//! Market capitalization of a Coinex account.
//!
//! Run with: cargo run --bin market_cap
//!
//! Values every balance in BTC through the Coinex BTC markets (highest bid),
//! then converts the total to USD at the Bitstamp last price.
//!
//! Output:
//!   xxxx BTC
//!   xxxx USD

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use ::coinex_tools::auth::{BitstampConfig, CoinexAuth};
use ::coinex_tools::market_cap::{format_amount, PriceTable, Valuation, BTC};
use ::coinex_tools::market_data::{MarketSnapshot, OrderBooks};
use ::coinex_tools::price_feed::PriceFeed;
use ::coinex_tools::trading_apis::CoinexClient;

#[derive(Debug, Parser)]
#[command(about = "Show the BTC and USD value of a Coinex account")]
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
        .context("Is coinex down? Failed to load markets")?;
    let btc = snapshot
        .catalog
        .by_abbreviation(BTC)
        .cloned()
        .context("Coinex does not list BTC")?;
    let balances = snapshot
        .balances(&client)
        .await
        .context("Is coinex down? Failed to get balances")?;

    // Only the BTC markets of currencies we hold are needed
    let mut books = OrderBooks::new();
    for balance in balances.iter().filter(|b| b.currency != btc) {
        if let Some(market) = snapshot.market(&btc, &balance.currency) {
            books
                .get_or_fetch(&client, market.id)
                .await
                .with_context(|| format!("Failed to get orders for {}", market.symbol()))?;
        }
    }
    info!("Fetched {} order books", books.len());

    let prices = PriceTable::btc_from_markets(&snapshot.markets, &books);
    let valuation = Valuation::compute(&balances, &prices);
    println!("{}", format_amount(valuation.total, BTC));

    let feed = PriceFeed::new(BitstampConfig::btc_usd())?;
    let btc_usd = feed
        .btc_usd()
        .await
        .context("Is bitstamp down? Failed to get BTC/USD price")?;
    println!("{}", format_amount(valuation.convert(btc_usd), "USD"));

    Ok(())
}
