//! Loads exchange state through the client and resolves it into models.

use std::collections::HashMap;
use tracing::{debug, info};

use crate::error::Result;
use crate::models::{Balance, Catalog, Currency, Market, Order, OrderBook, Trade};
use crate::trading_apis::CoinexClient;
use crate::types::{CurrencyRecord, TradePairRecord};

/// Currencies and markets, fetched once per run
#[derive(Debug, Clone)]
pub struct MarketSnapshot {
    pub catalog: Catalog,
    pub markets: Vec<Market>,
}

impl MarketSnapshot {
    pub fn from_records(
        currencies: Vec<CurrencyRecord>,
        trade_pairs: &[TradePairRecord],
    ) -> Result<Self> {
        let catalog = Catalog::from_records(currencies);
        let markets = trade_pairs
            .iter()
            .map(|rec| Market::from_record(rec, &catalog))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { catalog, markets })
    }

    pub async fn load(client: &CoinexClient) -> Result<Self> {
        let currencies = client.currencies().await?;
        let trade_pairs = client.trade_pairs().await?;
        let snapshot = Self::from_records(currencies, &trade_pairs)?;
        info!(
            "Loaded {} currencies and {} markets",
            snapshot.catalog.len(),
            snapshot.markets.len()
        );
        Ok(snapshot)
    }

    /// Account balances resolved against the catalog
    pub async fn balances(&self, client: &CoinexClient) -> Result<Vec<Balance>> {
        client
            .balances()
            .await?
            .iter()
            .map(|rec| Balance::from_record(rec, &self.catalog))
            .collect()
    }

    /// The market exchanging `to` for `from`, if the exchange lists one
    pub fn market(&self, from: &Currency, to: &Currency) -> Option<&Market> {
        self.markets
            .iter()
            .find(|m| m.from_currency == *from && m.to_currency == *to)
    }
}

/// Fetch the open orders of a market as an order book
pub async fn fetch_order_book(client: &CoinexClient, market_id: u64) -> Result<OrderBook> {
    let orders = client.orders(market_id).await?;
    debug!("Market {}: {} open orders", market_id, orders.len());
    Ok(OrderBook::from_orders(
        market_id,
        orders.iter().map(Order::from),
    ))
}

pub async fn fetch_last_trades(client: &CoinexClient, market_id: u64) -> Result<Vec<Trade>> {
    Ok(client
        .last_trades(market_id)
        .await?
        .iter()
        .map(Trade::from)
        .collect())
}

/// Order books keyed by market id; each market is fetched at most once
#[derive(Debug, Clone, Default)]
pub struct OrderBooks {
    books: HashMap<u64, OrderBook>,
}

impl OrderBooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, book: OrderBook) {
        self.books.insert(book.market_id, book);
    }

    pub fn get(&self, market_id: u64) -> Option<&OrderBook> {
        self.books.get(&market_id)
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Return the cached book, fetching it on first use
    pub async fn get_or_fetch(
        &mut self,
        client: &CoinexClient,
        market_id: u64,
    ) -> Result<&OrderBook> {
        if !self.books.contains_key(&market_id) {
            let book = fetch_order_book(client, market_id).await?;
            self.books.insert(market_id, book);
        }
        Ok(&self.books[&market_id])
    }

    /// Fetch the books of every market not cached yet, one request at a time
    pub async fn fetch_all(
        &mut self,
        client: &CoinexClient,
        market_ids: impl IntoIterator<Item = u64>,
    ) -> Result<()> {
        for id in market_ids {
            self.get_or_fetch(client, id).await?;
        }
        Ok(())
    }
}
