//! Canned exchange payloads and client builders.
//!
//! Payload builders take `(symbol, amount)` tuples and produce the wire
//! shape each sub-ledger endpoint returns, so tests describe balances rather
//! than JSON.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};

use crate::adapter::outbound::exchange::{ExchangeClient, RetryPolicy};
use crate::application::pricing::TICKER_PATH;
use crate::domain::symbol::pair;
use crate::infrastructure::config::Credentials;
use crate::port::outbound::{HttpResponse, Transport, TransportError};

/// Base URL every test client points at.
pub const BASE_URL: &str = "https://gateway.test";

/// Test credentials.
pub fn credentials() -> Credentials {
    Credentials::new("test-key", "test-secret")
}

/// Client over `transport` that retries without sleeping.
pub fn client(transport: Arc<dyn Transport>) -> Arc<ExchangeClient> {
    client_with_policy(transport, RetryPolicy::immediate(3))
}

/// Client over `transport` with an explicit retry policy.
pub fn client_with_policy(
    transport: Arc<dyn Transport>,
    policy: RetryPolicy,
) -> Arc<ExchangeClient> {
    Arc::new(ExchangeClient::new(
        transport,
        BASE_URL,
        &credentials(),
        policy,
        Duration::from_secs(5),
    ))
}

/// Transport result carrying `body` as JSON with `status`.
pub fn json_response(status: u16, body: &Value) -> Result<HttpResponse, TransportError> {
    Ok(HttpResponse::new(status, body.to_string()))
}

/// 200 with `body`.
pub fn ok(body: &Value) -> Result<HttpResponse, TransportError> {
    json_response(200, body)
}

/// Error response with an exchange-style `{"message": ...}` body.
pub fn error(status: u16, message: &str) -> Result<HttpResponse, TransportError> {
    json_response(status, &json!({ "message": message }))
}

/// `/v1/wallet/pockets` payload.
pub fn wallet_pockets(balances: &[(&str, &str)]) -> Value {
    Value::Array(
        balances
            .iter()
            .map(|(symbol, balance)| json!({ "symbol": symbol, "balance": balance }))
            .collect(),
    )
}

/// `/v1/pro/balances` payload with everything available and nothing locked.
pub fn pro_balances(balances: &[(&str, &str)]) -> Value {
    json!({
        "data": balances
            .iter()
            .map(|(currency, available)| {
                json!({ "currency": currency, "available": available, "locked": "0" })
            })
            .collect::<Vec<_>>()
    })
}

/// `/v1/earn/positions` payload.
pub fn earn_positions(positions: &[(&str, &str)]) -> Value {
    Value::Array(
        positions
            .iter()
            .map(|(asset, amount)| json!({ "asset": asset, "amount": amount }))
            .collect(),
    )
}

/// `/v1/loans` payload.
pub fn loans(collateral: &[(&str, &str)]) -> Value {
    Value::Array(
        collateral
            .iter()
            .map(|(symbol, amount)| {
                json!({ "collateral_symbol": symbol, "collateral_amount": amount })
            })
            .collect(),
    )
}

/// Ticker payload quoting `price`.
pub fn ticker(price: &str) -> Value {
    json!({ "data": { "last": price } })
}

/// Ticker path and query for a pair, as a `RoutedTransport` route.
pub fn ticker_path(base: &str, quote: &str) -> String {
    format!("{TICKER_PATH}?pair={}", pair(base, quote))
}
