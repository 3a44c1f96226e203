//! Type definitions for the Bitstamp ticker.

use serde::Deserialize;

/// Ticker snapshot from `api/ticker/`.
///
/// Prices arrive as decimal strings.
#[derive(Debug, Clone, Deserialize)]
pub struct BitstampTicker {
    /// Last traded price (USD per BTC)
    pub last: String,
    #[serde(default)]
    pub bid: Option<String>,
    #[serde(default)]
    pub ask: Option<String>,
}
