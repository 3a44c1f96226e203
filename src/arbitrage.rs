//! Triangular arbitrage scan.
//!
//! A chain walks three markets `c1 -> c2 -> c3 -> c1`, trading at the best
//! price on each book and paying the transaction fee after every trade.

use rust_decimal::Decimal;
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

use crate::market_data::OrderBooks;
use crate::models::{Currency, Market, OrderBook};

/// Fee charged on each trade (0.2%)
pub const TRANSACTION_FEE: Decimal = Decimal::from_parts(2, 0, 0, false, 3);

/// Why a chain could not be priced
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("no order book loaded for market {0}")]
    MissingBook(u64),

    #[error("no {side} orders on {market}")]
    EmptyBook { market: String, side: &'static str },

    #[error("{market} does not trade {currency}")]
    UnsupportedCurrency { market: String, currency: String },

    #[error("zero rate on {0}")]
    ZeroRate(String),
}

/// Convert `amount` across `market` into `target` at the best available price.
///
/// Buying `to_currency` pays the lowest ask; selling into `from_currency`
/// takes the highest bid.
pub fn convert(
    market: &Market,
    book: &OrderBook,
    amount: Decimal,
    target: &Currency,
) -> Result<Decimal, ChainError> {
    if *target == market.to_currency {
        let ask = book.lowest_ask().ok_or_else(|| ChainError::EmptyBook {
            market: market.symbol(),
            side: "ask",
        })?;
        amount
            .checked_div(ask.rate)
            .ok_or_else(|| ChainError::ZeroRate(market.symbol()))
    } else if *target == market.from_currency {
        let bid = book.highest_bid().ok_or_else(|| ChainError::EmptyBook {
            market: market.symbol(),
            side: "bid",
        })?;
        Ok(amount * bid.rate)
    } else {
        Err(ChainError::UnsupportedCurrency {
            market: market.symbol(),
            currency: target.abbreviation.clone(),
        })
    }
}

/// Three markets forming a currency cycle
#[derive(Debug, Clone, PartialEq)]
pub struct ArbitrageChain {
    pub markets: [Market; 3],
    /// `[c1, c2, c3]`; the walk ends back at `c1`
    pub currencies: [Currency; 3],
}

impl ArbitrageChain {
    /// Build the chain `m1.from -> m1.to -> c3 -> m1.from`, `c3` being the
    /// currency `m2` trades against `m1.to`
    pub fn new(m1: &Market, m2: &Market, m3: &Market) -> Option<Self> {
        let c1 = m1.from_currency.clone();
        let c2 = m1.to_currency.clone();
        let c3 = m2.other(&c2)?.clone();
        if !m3.contains(&c3) || !m3.contains(&c1) {
            return None;
        }
        Some(Self {
            markets: [m1.clone(), m2.clone(), m3.clone()],
            currencies: [c1, c2, c3],
        })
    }

    /// Return on investment of one unit of `c1` walked around the chain.
    ///
    /// `Decimal::ONE` means 100%.
    pub fn roi(&self, books: &OrderBooks, fee: Decimal) -> Result<Decimal, ChainError> {
        let keep = Decimal::ONE - fee;
        let targets = [
            &self.currencies[1],
            &self.currencies[2],
            &self.currencies[0],
        ];

        let mut amount = Decimal::ONE;
        for (market, target) in self.markets.iter().zip(targets) {
            let book = books
                .get(market.id)
                .ok_or(ChainError::MissingBook(market.id))?;
            amount = convert(market, book, amount, target)? * keep;
        }
        Ok(amount - Decimal::ONE)
    }
}

/// Every triangular chain the listed markets allow.
///
/// For each market m1, any other market m2 trading `m1.to` but not
/// `m1.from` picks the third currency, and any market m3 other than m2
/// trading both the third currency and `m1.from` closes the cycle.
pub fn find_chains(markets: &[Market]) -> Vec<ArbitrageChain> {
    let mut chains = Vec::new();

    for m1 in markets {
        let c1 = &m1.from_currency;
        let c2 = &m1.to_currency;

        for m2 in markets
            .iter()
            .filter(|m| m.id != m1.id && m.contains(c2) && !m.contains(c1))
        {
            let Some(c3) = m2.other(c2) else { continue };

            for m3 in markets
                .iter()
                .filter(|m| m.id != m2.id && m.contains(c3) && m.contains(c1))
            {
                if let Some(chain) = ArbitrageChain::new(m1, m2, m3) {
                    chains.push(chain);
                }
            }
        }
    }

    debug!("Found {} candidate chains", chains.len());
    chains
}

/// A chain with its computed ROI
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChain {
    pub chain: ArbitrageChain,
    pub roi: Decimal,
}

impl ScoredChain {
    #[inline]
    pub fn is_profitable(&self) -> bool {
        self.roi > Decimal::ZERO
    }
}

impl fmt::Display for ScoredChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [c1, c2, c3] = &self.chain.currencies;
        write!(
            f,
            "{:>4} -> {:>4} -> {:>4} -> {:>4} ({})%",
            c1,
            c2,
            c3,
            c1,
            (self.roi * Decimal::ONE_HUNDRED).round_dp(4).normalize()
        )
    }
}

/// Price every chain. Chains that cannot be priced are logged and dropped.
pub fn score_chains(
    chains: Vec<ArbitrageChain>,
    books: &OrderBooks,
    fee: Decimal,
) -> Vec<ScoredChain> {
    chains
        .into_iter()
        .filter_map(|chain| match chain.roi(books, fee) {
            Ok(roi) => Some(ScoredChain { chain, roi }),
            Err(e) => {
                warn!("Skipping chain: {}", e);
                None
            }
        })
        .collect()
}

/// Only the chains that make money after fees
pub fn profitable_chains(
    chains: Vec<ArbitrageChain>,
    books: &OrderBooks,
    fee: Decimal,
) -> Vec<ScoredChain> {
    score_chains(chains, books, fee)
        .into_iter()
        .filter(ScoredChain::is_profitable)
        .collect()
}
