//! Market capitalization of an account.
//!
//! Holdings are valued in BTC through the exchange's own BTC markets (at the
//! highest bid), then converted to USD with an external BTC/USD price.

use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::warn;

use crate::market_data::OrderBooks;
use crate::models::{Balance, Market};

/// Abbreviation of the currency every holding is valued in first
pub const BTC: &str = "BTC";

/// Price of each currency in one quote currency
#[derive(Debug, Clone)]
pub struct PriceTable {
    quote: String,
    prices: HashMap<String, Decimal>,
}

impl PriceTable {
    pub fn new(quote: impl Into<String>) -> Self {
        let quote = quote.into();
        let mut prices = HashMap::new();
        prices.insert(quote.clone(), Decimal::ONE);
        Self { quote, prices }
    }

    pub fn with_price(mut self, currency: impl Into<String>, price: Decimal) -> Self {
        self.insert(currency, price);
        self
    }

    pub fn insert(&mut self, currency: impl Into<String>, price: Decimal) {
        self.prices.insert(currency.into(), price);
    }

    pub fn get(&self, currency: &str) -> Option<Decimal> {
        self.prices.get(currency).copied()
    }

    pub fn quote(&self) -> &str {
        &self.quote
    }

    /// BTC prices from every `BTC -> X` market whose book has a bid.
    ///
    /// Markets without a cached book, or with no bids, are left out.
    pub fn btc_from_markets(markets: &[Market], books: &OrderBooks) -> Self {
        let mut table = Self::new(BTC);
        for market in markets
            .iter()
            .filter(|m| m.from_currency.abbreviation == BTC)
        {
            let Some(book) = books.get(market.id) else {
                continue;
            };
            match book.highest_bid() {
                Some(bid) => table.insert(market.to_currency.abbreviation.clone(), bid.rate),
                None => warn!("No bid on {}, not priced", market.symbol()),
            }
        }
        table
    }
}

/// Result of valuing a set of balances
#[derive(Debug, Clone, PartialEq)]
pub struct Valuation {
    pub quote: String,
    pub total: Decimal,
    /// Value of each priced holding
    pub contributions: Vec<(String, Decimal)>,
    /// Currencies held that had no price
    pub skipped: Vec<String>,
}

impl Valuation {
    /// Sum `total * price` over every balance with a known price.
    ///
    /// Held amounts count toward the total. Unpriced currencies are skipped
    /// with a warning.
    pub fn compute(balances: &[Balance], prices: &PriceTable) -> Self {
        let mut total = Decimal::ZERO;
        let mut contributions = Vec::new();
        let mut skipped = Vec::new();

        for balance in balances {
            let abbreviation = &balance.currency.abbreviation;
            match prices.get(abbreviation) {
                Some(price) => {
                    let value = balance.total() * price;
                    total += value;
                    contributions.push((abbreviation.clone(), value));
                }
                None => {
                    warn!("Cannot convert {} to {}", abbreviation, prices.quote());
                    skipped.push(abbreviation.clone());
                }
            }
        }

        Self {
            quote: prices.quote().to_string(),
            total,
            contributions,
            skipped,
        }
    }

    /// The total expressed in another currency at `rate` units per quote unit
    pub fn convert(&self, rate: Decimal) -> Decimal {
        self.total * rate
    }
}

/// One report line: amount rounded to 8 decimals, right-aligned to 12 columns
pub fn format_amount(amount: Decimal, currency: &str) -> String {
    format!("{:12.8} {}", amount.round_dp(8), currency)
}
