//! Coinex account and market tools
//!
//! This library provides modules for:
//! - Authentication with the Coinex API (HMAC-SHA512 request signing)
//! - REST API calls for market data, balances and orders
//! - Typed models over the raw JSON records
//! - Market capitalization of an account in BTC and USD
//! - Triangular arbitrage detection across Coinex markets

pub mod arbitrage;
pub mod auth;
pub mod error;
pub mod market_cap;
pub mod market_data;
pub mod models;
pub mod price_feed;
pub mod trading_apis;
pub mod types;

pub use error::{CoinexError, Result};
