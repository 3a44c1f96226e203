//! Error type shared by the API client, the price feed and the model layer.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoinexError>;

#[derive(Debug, Error)]
pub enum CoinexError {
    /// The request never produced a response (DNS, TLS, timeout, ...)
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-2xx status
    #[error("request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not the JSON we expected
    #[error("invalid JSON response: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("missing field: {0}")]
    MissingField(String),

    #[error("unknown currency id {0}")]
    UnknownCurrency(u64),

    #[error("invalid price {0:?}")]
    InvalidPrice(String),

    #[error("invalid amount {0}")]
    InvalidAmount(String),

    #[error("missing credentials: {0}")]
    Credentials(String),
}

impl CoinexError {
    /// True for the "request failed" family (transport, status, body).
    pub fn is_request_failure(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Status { .. } | Self::InvalidJson(_)
        )
    }

    /// True for the "missing field" family.
    pub fn is_missing_field(&self) -> bool {
        matches!(self, Self::MissingField(_) | Self::UnknownCurrency(_))
    }
}
