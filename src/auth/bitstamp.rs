//! Bitstamp REST configuration.
//!
//! No authentication required for the public ticker.

/// Bitstamp public ticker (BTC/USD)
pub const BITSTAMP_TICKER_URL: &str = "https://www.bitstamp.net/api/ticker/";

/// Configuration for the Bitstamp price feed
#[derive(Debug, Clone)]
pub struct BitstampConfig {
    pub ticker_url: String,
}

impl BitstampConfig {
    /// Config for the live BTC/USD ticker
    pub fn btc_usd() -> Self {
        Self {
            ticker_url: BITSTAMP_TICKER_URL.to_string(),
        }
    }

    /// Config pointing at a custom ticker URL
    pub fn new(ticker_url: impl Into<String>) -> Self {
        Self {
            ticker_url: ticker_url.into(),
        }
    }
}

impl Default for BitstampConfig {
    fn default() -> Self {
        Self::btc_usd()
    }
}
