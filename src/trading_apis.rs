//! Coinex REST API client for market data, balances and orders.

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::auth::CoinexAuth;
use crate::error::{CoinexError, Result};
use crate::models::{to_scaled, Side};
use crate::types::coinex::{
    BalancesResponse, CurrenciesResponse, OrdersResponse, TradePairsResponse, TradesResponse,
};
use crate::types::{
    BalanceRecord, CurrencyRecord, NewOrder, OrderRecord, SubmitOrderRequest, TradePairRecord,
    TradeRecord,
};

/// Coinex REST API base URL
pub const COINEX_API_URL: &str = "https://coinex.pw/api/v2/";

/// Request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = "coinex-tools";

/// Coinex REST API client.
///
/// Every call is a single attempt: no retries, no backoff.
pub struct CoinexClient {
    http: reqwest::Client,
    auth: Option<CoinexAuth>,
    base_url: String,
}

impl CoinexClient {
    /// Client able to call private endpoints
    pub fn new(auth: CoinexAuth) -> Result<Self> {
        Ok(Self {
            http: build_http()?,
            auth: Some(auth),
            base_url: COINEX_API_URL.to_string(),
        })
    }

    /// Client limited to public market data
    pub fn public() -> Result<Self> {
        Ok(Self {
            http: build_http()?,
            auth: None,
            base_url: COINEX_API_URL.to_string(),
        })
    }

    /// Point the client at another server
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, page: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), page)
    }

    fn auth(&self) -> Result<&CoinexAuth> {
        self.auth
            .as_ref()
            .ok_or_else(|| CoinexError::Credentials("private endpoint needs an API key".into()))
    }

    // =========================================================================
    // Internal HTTP Methods
    // =========================================================================

    /// Unauthenticated GET
    async fn get_public<T: DeserializeOwned>(&self, page: &str) -> Result<T> {
        debug!("GET {}", page);
        let request = self.http.get(self.url(page));
        self.send(request).await
    }

    /// Authenticated GET: the signature covers the empty body
    async fn get_private<T: DeserializeOwned>(&self, page: &str) -> Result<T> {
        let auth = self.auth()?;
        let signature = auth.sign(b"")?;
        debug!("GET {} (signed)", page);

        let request = self
            .http
            .get(self.url(page))
            .header("API-Key", &auth.api_key)
            .header("API-Sign", signature);
        self.send(request).await
    }

    /// Authenticated POST with an optional JSON payload
    async fn post_private<T: DeserializeOwned, B: Serialize>(
        &self,
        page: &str,
        body: Option<&B>,
    ) -> Result<T> {
        let auth = self.auth()?;
        let payload = match body {
            Some(b) => serde_json::to_string(b)?,
            None => String::new(),
        };
        let signature = auth.sign(payload.as_bytes())?;
        debug!("POST {} (signed, {} bytes)", page, payload.len());

        let request = self
            .http
            .post(self.url(page))
            .header("API-Key", &auth.api_key)
            .header("API-Sign", signature)
            .body(payload);
        self.send(request).await
    }

    /// Send a request and decode the body.
    ///
    /// Non-2xx statuses and bodies that are not JSON are request failures;
    /// JSON that lacks the expected fields is a missing-field failure.
    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
        let resp = request
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
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

    // =========================================================================
    // Market Data (public)
    // =========================================================================

    /// List every currency the exchange knows
    pub async fn currencies(&self) -> Result<Vec<CurrencyRecord>> {
        let resp: CurrenciesResponse = self.get_public("currencies").await?;
        Ok(resp.currencies)
    }

    /// List every trade pair
    pub async fn trade_pairs(&self) -> Result<Vec<TradePairRecord>> {
        let resp: TradePairsResponse = self.get_public("trade_pairs").await?;
        Ok(resp.trade_pairs)
    }

    /// Open orders (the order book) of a trade pair
    pub async fn orders(&self, trade_pair_id: u64) -> Result<Vec<OrderRecord>> {
        let page = format!("orders?tradePair={}", trade_pair_id);
        let resp: OrdersResponse = self.get_public(&page).await?;
        Ok(resp.orders)
    }

    /// Most recent trades of a trade pair
    pub async fn last_trades(&self, trade_pair_id: u64) -> Result<Vec<TradeRecord>> {
        let page = format!("trades?tradePair={}", trade_pair_id);
        let resp: TradesResponse = self.get_public(&page).await?;
        Ok(resp.trades)
    }

    // =========================================================================
    // Account (private)
    // =========================================================================

    pub async fn balances(&self) -> Result<Vec<BalanceRecord>> {
        let resp: BalancesResponse = self.get_private("balances").await?;
        Ok(resp.balances)
    }

    /// Our own open orders
    pub async fn open_orders(&self) -> Result<Vec<OrderRecord>> {
        let resp: OrdersResponse = self.get_private("orders/own").await?;
        Ok(resp.orders)
    }

    // =========================================================================
    // Orders (private)
    // =========================================================================

    /// Place an order. `amount` and `rate` are truncated to 8 decimals.
    pub async fn submit_order(
        &self,
        trade_pair_id: u64,
        amount: Decimal,
        side: Side,
        rate: Decimal,
    ) -> Result<OrderRecord> {
        let request = SubmitOrderRequest {
            order: NewOrder {
                trade_pair_id,
                amount: to_scaled(amount)?,
                bid: side == Side::Bid,
                rate: to_scaled(rate)?,
            },
        };
        info!(
            "Submitting order: {} {} @ {} on pair {}",
            side, amount, rate, trade_pair_id
        );
        let resp: OrdersResponse = self.post_private("orders", Some(&request)).await?;
        first_order(resp)
    }

    pub async fn order_status(&self, order_id: u64) -> Result<OrderRecord> {
        let page = format!("orders/{}", order_id);
        let resp: OrdersResponse = self.get_private(&page).await?;
        first_order(resp)
    }

    pub async fn cancel_order(&self, order_id: u64) -> Result<OrderRecord> {
        let page = format!("orders/{}/cancel", order_id);
        let resp: OrdersResponse = self.post_private::<_, ()>(&page, None).await?;
        first_order(resp)
    }

    /// Poll an order until it is complete or cancelled.
    ///
    /// Gives up after `max_polls` status requests and returns the last state
    /// seen; callers check `complete` / `cancelled` themselves.
    pub async fn wait_for_order(
        &self,
        order_id: u64,
        poll_interval: Duration,
        max_polls: u32,
    ) -> Result<OrderRecord> {
        let mut order = self.order_status(order_id).await?;
        let mut polls = 1;

        while !order.complete && !order.cancelled && polls < max_polls {
            tokio::time::sleep(poll_interval).await;
            order = self.order_status(order_id).await?;
            polls += 1;
        }

        debug!(
            "Order {} after {} polls: complete={} cancelled={}",
            order_id, polls, order.complete, order.cancelled
        );
        Ok(order)
    }
}

fn build_http() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?)
}

/// Parse a response body: malformed JSON is a request failure, well-formed
/// JSON of the wrong shape is a missing field.
pub(crate) fn decode<T: DeserializeOwned>(body: &str) -> Result<T> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    serde_json::from_value(value).map_err(|e| CoinexError::MissingField(e.to_string()))
}

fn first_order(resp: OrdersResponse) -> Result<OrderRecord> {
    resp.orders
        .into_iter()
        .next()
        .ok_or_else(|| CoinexError::MissingField("orders[0]".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use rust_decimal_macros::dec;

    fn auth() -> CoinexAuth {
        CoinexAuth::new("test-key", "test-secret")
    }

    fn client(server: &Server) -> CoinexClient {
        CoinexClient::new(auth()).unwrap().with_base_url(server.url())
    }

    #[tokio::test]
    async fn test_balances_are_signed() {
        let mut server = Server::new_async().await;
        let signature = auth().sign(b"").unwrap();
        let mock = server
            .mock("GET", "/balances")
            .match_header("API-Key", "test-key")
            .match_header("API-Sign", signature.as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"balances": [{"currency_id": 1, "amount": 100000000, "held": 0}]}"#)
            .create_async()
            .await;

        let balances = client(&server).balances().await.unwrap();
        mock.assert_async().await;
        assert_eq!(balances.len(), 1);
        assert_eq!(balances[0].amount, 100_000_000);
    }

    #[tokio::test]
    async fn test_non_success_status_is_request_failure() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/currencies")
            .with_status(503)
            .with_body("maintenance")
            .create_async()
            .await;

        let err = client(&server).currencies().await.unwrap_err();
        assert!(err.is_request_failure());
        match err {
            CoinexError::Status { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "maintenance");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_json_is_request_failure() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/trade_pairs")
            .with_status(200)
            .with_body("<html>oops</html>")
            .create_async()
            .await;

        let err = client(&server).trade_pairs().await.unwrap_err();
        assert!(matches!(err, CoinexError::InvalidJson(_)));
        assert!(err.is_request_failure());
    }

    #[tokio::test]
    async fn test_missing_envelope_key_is_missing_field() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/currencies")
            .with_status(200)
            .with_body(r#"{"error": "nope"}"#)
            .create_async()
            .await;

        let err = client(&server).currencies().await.unwrap_err();
        assert!(err.is_missing_field());
    }

    #[tokio::test]
    async fn test_order_book_query() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", Matcher::Regex("^/orders".into()))
            .match_query(Matcher::UrlEncoded("tradePair".into(), "2".into()))
            .with_status(200)
            .with_body(
                r#"{"orders": [
                    {"id": 1, "trade_pair_id": 2, "bid": true, "rate": 1900000, "amount": 100000000},
                    {"id": 2, "trade_pair_id": 2, "bid": false, "rate": 2100000, "amount": 50000000}
                ]}"#,
            )
            .create_async()
            .await;

        let orders = CoinexClient::public()
            .unwrap()
            .with_base_url(server.url())
            .orders(2)
            .await
            .unwrap();
        assert_eq!(orders.len(), 2);
        assert!(orders[0].bid);
        assert!(!orders[1].bid);
    }

    #[tokio::test]
    async fn test_submit_order_body_and_signature() {
        let mut server = Server::new_async().await;
        let body = serde_json::to_string(&SubmitOrderRequest {
            order: NewOrder {
                trade_pair_id: 2,
                amount: 150_000_000,
                bid: true,
                rate: 2_000_000,
            },
        })
        .unwrap();
        let signature = auth().sign(body.as_bytes()).unwrap();
        let mock = server
            .mock("POST", "/orders")
            .match_header("API-Sign", signature.as_str())
            .match_body(Matcher::Json(serde_json::json!({
                "order": {"trade_pair_id": 2, "amount": 150000000, "bid": true, "rate": 2000000}
            })))
            .with_status(200)
            .with_body(
                r#"{"order": [{"id": 42, "trade_pair_id": 2, "bid": true, "rate": 2000000, "amount": 150000000}]}"#,
            )
            .create_async()
            .await;

        let order = client(&server)
            .submit_order(2, dec!(1.5), Side::Bid, dec!(0.02))
            .await
            .unwrap();
        mock.assert_async().await;
        assert_eq!(order.id, 42);
    }

    #[tokio::test]
    async fn test_cancel_order_posts_empty_body() {
        let mut server = Server::new_async().await;
        let signature = auth().sign(b"").unwrap();
        let mock = server
            .mock("POST", "/orders/42/cancel")
            .match_header("API-Sign", signature.as_str())
            .with_status(200)
            .with_body(
                r#"{"orders": [{"id": 42, "trade_pair_id": 2, "bid": true, "rate": 1, "amount": 1, "cancelled": true}]}"#,
            )
            .create_async()
            .await;

        let order = client(&server).cancel_order(42).await.unwrap();
        mock.assert_async().await;
        assert!(order.cancelled);
    }

    #[tokio::test]
    async fn test_empty_order_list_is_missing_field() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/orders/7")
            .with_status(200)
            .with_body(r#"{"orders": []}"#)
            .create_async()
            .await;

        let err = client(&server).order_status(7).await.unwrap_err();
        assert!(err.is_missing_field());
    }

    #[tokio::test]
    async fn test_wait_for_order_stops_when_complete() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/orders/9")
            .with_status(200)
            .with_body(
                r#"{"orders": [{"id": 9, "trade_pair_id": 2, "bid": true, "rate": 1, "amount": 1, "complete": true}]}"#,
            )
            .expect(1)
            .create_async()
            .await;

        let order = client(&server)
            .wait_for_order(9, Duration::from_millis(1), 5)
            .await
            .unwrap();
        mock.assert_async().await;
        assert!(order.complete);
    }

    #[tokio::test]
    async fn test_wait_for_order_gives_up_after_max_polls() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/orders/9")
            .with_status(200)
            .with_body(
                r#"{"orders": [{"id": 9, "trade_pair_id": 2, "bid": true, "rate": 1, "amount": 1}]}"#,
            )
            .expect(3)
            .create_async()
            .await;

        let order = client(&server)
            .wait_for_order(9, Duration::from_millis(1), 3)
            .await
            .unwrap();
        mock.assert_async().await;
        assert!(!order.complete);
        assert!(!order.cancelled);
    }

    #[tokio::test]
    async fn test_wait_for_order_stops_when_cancelled() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/orders/9")
            .with_status(200)
            .with_body(
                r#"{"orders": [{"id": 9, "trade_pair_id": 2, "bid": true, "rate": 1, "amount": 1, "cancelled": true}]}"#,
            )
            .expect(1)
            .create_async()
            .await;

        let order = client(&server)
            .wait_for_order(9, Duration::from_millis(1), 5)
            .await
            .unwrap();
        mock.assert_async().await;
        assert!(order.cancelled);
        assert!(!order.complete);
    }

    #[tokio::test]
    async fn test_private_call_without_credentials_fails() {
        let client = CoinexClient::public()
            .unwrap()
            .with_base_url("http://127.0.0.1:9");
        let err = client.balances().await.unwrap_err();
        assert!(matches!(err, CoinexError::Credentials(_)));
    }
}
