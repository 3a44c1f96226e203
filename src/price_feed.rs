//! External BTC/USD price feed (Bitstamp public ticker).

use rust_decimal::Decimal;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

use crate::auth::BitstampConfig;
use crate::error::{CoinexError, Result};
use crate::trading_apis::decode;
use crate::types::BitstampTicker;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

impl BitstampTicker {
    /// Last traded price as a decimal
    pub fn last_price(&self) -> Result<Decimal> {
        parse_price(&self.last)
    }

    pub fn bid_price(&self) -> Option<Decimal> {
        self.bid.as_deref().and_then(|b| Decimal::from_str(b).ok())
    }

    pub fn ask_price(&self) -> Option<Decimal> {
        self.ask.as_deref().and_then(|a| Decimal::from_str(a).ok())
    }
}

fn parse_price(raw: &str) -> Result<Decimal> {
    Decimal::from_str(raw.trim()).map_err(|_| CoinexError::InvalidPrice(raw.to_string()))
}

/// Read-only client for the Bitstamp ticker
pub struct PriceFeed {
    http: reqwest::Client,
    config: BitstampConfig,
}

impl PriceFeed {
    pub fn new(config: BitstampConfig) -> Result<Self> {
        Ok(Self {
            http: reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            config,
        })
    }

    /// Fetch the full ticker snapshot
    pub async fn ticker(&self) -> Result<BitstampTicker> {
        debug!("GET {}", self.config.ticker_url);
        let resp = self
            .http
            .get(&self.config.ticker_url)
            .header("Accept", "application/json")
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(CoinexError::Status {
                status: status.as_u16(),
                body,
            });
        }

        decode(&body)
    }

    /// Last BTC price in USD
    pub async fn btc_usd(&self) -> Result<Decimal> {
        self.ticker().await?.last_price()
    }
}
