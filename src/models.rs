//! Typed views over the raw Coinex records.
//!
//! Records are resolved against a [`Catalog`] of currencies so that callers
//! work with abbreviations and decimals instead of ids and scaled integers.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{CoinexError, Result};
use crate::types::coinex::AMOUNT_SCALE;
use crate::types::{BalanceRecord, CurrencyRecord, OrderRecord, TradePairRecord, TradeRecord};

// =============================================================================
// Fixed-point conversion
// =============================================================================

/// Convert a wire integer (scaled by 10^8) to a decimal
#[inline]
pub fn from_scaled(raw: i64) -> Decimal {
    Decimal::new(raw, AMOUNT_SCALE)
}

/// Convert a decimal to a wire integer, truncating digits past 10^-8
pub fn to_scaled(value: Decimal) -> Result<i64> {
    if value.is_sign_negative() {
        return Err(CoinexError::InvalidAmount(value.to_string()));
    }
    value
        .checked_mul(Decimal::from(10i64.pow(AMOUNT_SCALE)))
        .and_then(|scaled| scaled.trunc().to_i64())
        .ok_or_else(|| CoinexError::InvalidAmount(value.to_string()))
}

// =============================================================================
// Currencies
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Currency {
    pub id: u64,
    pub abbreviation: String,
    pub name: String,
}

impl From<CurrencyRecord> for Currency {
    fn from(rec: CurrencyRecord) -> Self {
        Self {
            id: rec.id,
            abbreviation: rec.abbreviation,
            name: rec.name,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.abbreviation)
    }
}

/// The exchange's currency table, keyed by id
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    by_id: BTreeMap<u64, Currency>,
}

impl Catalog {
    pub fn from_records(records: impl IntoIterator<Item = CurrencyRecord>) -> Self {
        Self {
            by_id: records
                .into_iter()
                .map(|rec| (rec.id, Currency::from(rec)))
                .collect(),
        }
    }

    /// Resolve a currency id, failing if the exchange never announced it
    pub fn get(&self, id: u64) -> Result<&Currency> {
        self.by_id.get(&id).ok_or(CoinexError::UnknownCurrency(id))
    }

    pub fn by_abbreviation(&self, abbreviation: &str) -> Option<&Currency> {
        self.by_id
            .values()
            .find(|c| c.abbreviation.eq_ignore_ascii_case(abbreviation))
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

// =============================================================================
// Balances
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Balance {
    pub currency: Currency,
    /// Available amount
    pub amount: Decimal,
    /// Amount locked in open orders
    pub held: Decimal,
}

impl Balance {
    pub fn new(currency: Currency, amount: Decimal) -> Self {
        Self {
            currency,
            amount,
            held: Decimal::ZERO,
        }
    }

    pub fn from_record(rec: &BalanceRecord, catalog: &Catalog) -> Result<Self> {
        Ok(Self {
            currency: catalog.get(rec.currency_id)?.clone(),
            amount: from_scaled(rec.amount),
            held: from_scaled(rec.held),
        })
    }

    /// Everything owned: available plus held
    #[inline]
    pub fn total(&self) -> Decimal {
        self.amount + self.held
    }
}

// =============================================================================
// Markets
// =============================================================================

/// A trade pair. Rates are quoted in `from_currency` per unit of `to_currency`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Market {
    pub id: u64,
    pub from_currency: Currency,
    pub to_currency: Currency,
    pub last_price: Option<Decimal>,
}

impl Market {
    pub fn from_record(rec: &TradePairRecord, catalog: &Catalog) -> Result<Self> {
        Ok(Self {
            id: rec.id,
            from_currency: catalog.get(rec.market_id)?.clone(),
            to_currency: catalog.get(rec.currency_id)?.clone(),
            last_price: rec.last_price.map(from_scaled),
        })
    }

    #[inline]
    pub fn contains(&self, currency: &Currency) -> bool {
        self.from_currency == *currency || self.to_currency == *currency
    }

    /// The currency on the other side of `currency`, if this market trades it
    pub fn other(&self, currency: &Currency) -> Option<&Currency> {
        if self.from_currency == *currency {
            Some(&self.to_currency)
        } else if self.to_currency == *currency {
            Some(&self.from_currency)
        } else {
            None
        }
    }

    /// e.g. "LTC/BTC"
    pub fn symbol(&self) -> String {
        format!(
            "{}/{}",
            self.to_currency.abbreviation, self.from_currency.abbreviation
        )
    }
}

// =============================================================================
// Orders and trades
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Buy
    Bid,
    /// Sell
    Ask,
}

impl Side {
    #[inline]
    pub fn from_bid_flag(bid: bool) -> Self {
        if bid {
            Self::Bid
        } else {
            Self::Ask
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bid => write!(f, "bid"),
            Self::Ask => write!(f, "ask"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: u64,
    pub market_id: u64,
    pub side: Side,
    pub rate: Decimal,
    pub amount: Decimal,
    pub filled: Decimal,
    pub complete: bool,
    pub cancelled: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    #[inline]
    pub fn is_bid(&self) -> bool {
        self.side == Side::Bid
    }

    /// Complete or cancelled: nothing more will happen to this order
    pub fn is_finished(&self) -> bool {
        self.complete || self.cancelled
    }
}

impl From<&OrderRecord> for Order {
    fn from(rec: &OrderRecord) -> Self {
        Self {
            id: rec.id,
            market_id: rec.trade_pair_id,
            side: Side::from_bid_flag(rec.bid),
            rate: from_scaled(rec.rate),
            amount: from_scaled(rec.amount),
            filled: from_scaled(rec.filled),
            complete: rec.complete,
            cancelled: rec.cancelled,
            created_at: rec.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub id: u64,
    pub market_id: u64,
    pub side: Side,
    pub rate: Decimal,
    pub amount: Decimal,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<&TradeRecord> for Trade {
    fn from(rec: &TradeRecord) -> Self {
        Self {
            id: rec.id,
            market_id: rec.trade_pair_id,
            side: Side::from_bid_flag(rec.bid),
            rate: from_scaled(rec.rate),
            amount: from_scaled(rec.amount),
            created_at: rec.created_at,
        }
    }
}

// =============================================================================
// Order book and ticker
// =============================================================================

/// Open orders of one market, split by side
#[derive(Debug, Clone, Default)]
pub struct OrderBook {
    pub market_id: u64,
    pub bids: Vec<Order>,
    pub asks: Vec<Order>,
}

impl OrderBook {
    pub fn from_orders(market_id: u64, orders: impl IntoIterator<Item = Order>) -> Self {
        let (bids, asks): (Vec<Order>, Vec<Order>) = orders
            .into_iter()
            .filter(|o| !o.is_finished())
            .partition(Order::is_bid);
        Self {
            market_id,
            bids,
            asks,
        }
    }

    /// The highest price someone is willing to buy for
    pub fn highest_bid(&self) -> Option<&Order> {
        self.bids.iter().max_by(|a, b| a.rate.cmp(&b.rate))
    }

    /// The lowest price someone is willing to sell for
    pub fn lowest_ask(&self) -> Option<&Order> {
        self.asks.iter().min_by(|a, b| a.rate.cmp(&b.rate))
    }

    pub fn ticker(&self, market: &Market) -> Ticker {
        Ticker {
            symbol: market.symbol(),
            bid: self.highest_bid().map(|o| o.rate),
            ask: self.lowest_ask().map(|o| o.rate),
            last: market.last_price,
        }
    }
}

/// Price snapshot for a market
#[derive(Debug, Clone, PartialEq)]
pub struct Ticker {
    pub symbol: String,
    pub bid: Option<Decimal>,
    pub ask: Option<Decimal>,
    pub last: Option<Decimal>,
}

impl Ticker {
    pub fn spread(&self) -> Option<Decimal> {
        Some(self.ask? - self.bid?)
    }

    pub fn mid(&self) -> Option<Decimal> {
        Some((self.ask? + self.bid?) / Decimal::TWO)
    }
}
