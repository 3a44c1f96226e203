//! Wire types for the Coinex v2 REST API.
//!
//! Every amount and rate is an integer scaled by 10^8 on the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fixed-point scale of amounts and rates on the wire
pub const AMOUNT_SCALE: u32 = 8;

// =============================================================================
// Records
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CurrencyRecord {
    pub id: u64,
    pub name: String,
    pub abbreviation: String,
}

/// A trade pair: `currency_id` is traded, priced in `market_id`.
#[derive(Debug, Clone, Deserialize)]
pub struct TradePairRecord {
    pub id: u64,
    pub currency_id: u64,
    pub market_id: u64,
    #[serde(default)]
    pub last_price: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BalanceRecord {
    pub currency_id: u64,
    pub amount: i64,
    #[serde(default)]
    pub held: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderRecord {
    pub id: u64,
    pub trade_pair_id: u64,
    pub bid: bool,
    pub rate: i64,
    pub amount: i64,
    #[serde(default)]
    pub filled: i64,
    #[serde(default)]
    pub complete: bool,
    #[serde(default)]
    pub cancelled: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TradeRecord {
    pub id: u64,
    pub trade_pair_id: u64,
    pub bid: bool,
    pub rate: i64,
    pub amount: i64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Response envelopes
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CurrenciesResponse {
    pub currencies: Vec<CurrencyRecord>,
}

#[derive(Debug, Deserialize)]
pub struct TradePairsResponse {
    pub trade_pairs: Vec<TradePairRecord>,
}

#[derive(Debug, Deserialize)]
pub struct BalancesResponse {
    pub balances: Vec<BalanceRecord>,
}

/// Order lists come back under `orders`; order submission answers under `order`.
#[derive(Debug, Deserialize)]
pub struct OrdersResponse {
    #[serde(alias = "order")]
    pub orders: Vec<OrderRecord>,
}

#[derive(Debug, Deserialize)]
pub struct TradesResponse {
    pub trades: Vec<TradeRecord>,
}

// =============================================================================
// Requests
// =============================================================================

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NewOrder {
    pub trade_pair_id: u64,
    pub amount: i64,
    pub bid: bool,
    pub rate: i64,
}

/// Body of `POST orders`: the order sits under an `order` root key.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitOrderRequest {
    pub order: NewOrder,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_record_defaults() {
        let json = r#"{"id": 7, "trade_pair_id": 2, "bid": false, "rate": 150000, "amount": 300000000}"#;
        let order: OrderRecord = serde_json::from_str(json).unwrap();
        assert_eq!(order.filled, 0);
        assert!(!order.complete);
        assert!(!order.cancelled);
        assert!(order.created_at.is_none());
    }

    #[test]
    fn test_order_record_timestamp() {
        let json = r#"{"id": 7, "trade_pair_id": 2, "bid": true, "rate": 1, "amount": 1,
                       "created_at": "2014-02-11T20:23:41.417Z"}"#;
        let order: OrderRecord = serde_json::from_str(json).unwrap();
        let ts = order.created_at.unwrap();
        assert_eq!(ts.timestamp(), 1392150221);
    }

    #[test]
    fn test_submit_order_body_shape() {
        let body = SubmitOrderRequest {
            order: NewOrder {
                trade_pair_id: 2,
                amount: 100_000_000,
                bid: true,
                rate: 2_000_000,
            },
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "order": {"trade_pair_id": 2, "amount": 100000000, "bid": true, "rate": 2000000}
            })
        );
    }

    #[test]
    fn test_orders_response_accepts_order_key() {
        let json = r#"{"order": [{"id": 1, "trade_pair_id": 2, "bid": true, "rate": 1, "amount": 1}]}"#;
        let resp: OrdersResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.orders.len(), 1);
    }

    #[test]
    fn test_balance_record_missing_amount_fails() {
        let json = r#"{"currency_id": 1, "held": 0}"#;
        assert!(serde_json::from_str::<BalanceRecord>(json).is_err());
    }
}
