//! Never-failing unit price lookup.

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::future::join_all;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::{debug, warn};

use crate::adapter::outbound::exchange::ledger::unwrap_data;
use crate::adapter::outbound::exchange::ExchangeClient;
use crate::application::cache::{CacheCategory, ResponseCache};
use crate::domain::symbol::{is_pseudo_asset, normalize, pair};
use crate::domain::{parse_amount, Price};

/// Ticker endpoint; takes a `pair=BASE-QUOTE` parameter.
pub const TICKER_PATH: &str = "/v1/markets/ticker";

/// Fields that may carry the last traded price, in lookup order.
const PRICE_FIELDS: [&str; 3] = ["last", "last_price", "price"];

/// Resolves the price of one unit of an asset in a quote currency.
///
/// Lookups never fail: anything that prevents a price from being read
/// (pseudo-assets, upstream errors, odd payloads) resolves to zero, so one
/// unknown asset cannot sink a whole valuation.
#[derive(Debug, Clone)]
pub struct PriceResolver {
    client: Arc<ExchangeClient>,
    cache: Option<Arc<ResponseCache>>,
}

impl PriceResolver {
    #[must_use]
    pub const fn new(client: Arc<ExchangeClient>) -> Self {
        Self {
            client,
            cache: None,
        }
    }

    /// Cache successful lookups in `cache` as market data.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<ResponseCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Price of one `symbol` in `quote`.
    ///
    /// Returns 1 when both name the same asset and 0 for pseudo-assets,
    /// without contacting the exchange. Any failure also yields 0.
    pub async fn get_market_price(&self, symbol: &str, quote: &str) -> Price {
        if normalize(symbol) == normalize(quote) {
            return Decimal::ONE;
        }
        if is_pseudo_asset(symbol) {
            debug!(symbol, "Pseudo-asset has no market price");
            return Decimal::ZERO;
        }

        let pair = pair(symbol, quote);
        let key = format!("ticker:{pair}");
        if let Some(price) = self.cached(&key) {
            debug!(pair = %pair, %price, "Price cache hit");
            return price;
        }

        let params = [("pair".to_string(), pair.clone())];
        match self.client.get(TICKER_PATH, &params).await {
            Ok(payload) => match extract_price(&payload) {
                Some(price) => {
                    if let Some(cache) = &self.cache {
                        cache.set(
                            &key,
                            Value::String(price.to_string()),
                            CacheCategory::MarketData,
                            None,
                        );
                    }
                    price
                }
                None => {
                    warn!(pair = %pair, "Ticker response has no usable price");
                    Decimal::ZERO
                }
            },
            Err(err) => {
                warn!(pair = %pair, kind = err.kind(), error = %err, "Price lookup failed");
                Decimal::ZERO
            }
        }
    }

    /// Resolve prices for many symbols concurrently.
    ///
    /// The returned map is keyed by each symbol exactly as given.
    pub async fn resolve_all(&self, symbols: &[String], quote: &str) -> HashMap<String, Price> {
        let lookups = symbols.iter().map(|symbol| async move {
            let price = self.get_market_price(symbol, quote).await;
            (symbol.clone(), price)
        });
        join_all(lookups).await.into_iter().collect()
    }

    fn cached(&self, key: &str) -> Option<Price> {
        self.cache
            .as_ref()
            .and_then(|cache| cache.get(key))
            .and_then(|value| parse_amount(&value))
    }
}

/// Read the price out of a ticker payload.
///
/// Accepts the ticker object bare, wrapped in `{"data": ...}`, or as the
/// first element of a list.
fn extract_price(payload: &Value) -> Option<Price> {
    let ticker = match unwrap_data(payload) {
        Value::Array(items) => items.first()?,
        other => other,
    };
    let fields = ticker.as_object()?;
    PRICE_FIELDS
        .iter()
        .find_map(|field| fields.get(*field).and_then(parse_amount))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::fixtures::{self, ticker, ticker_path};
    use crate::testkit::transport::RoutedTransport;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn resolver(transport: &Arc<RoutedTransport>) -> PriceResolver {
        PriceResolver::new(fixtures::client(transport.clone()))
    }

    #[test]
    fn extract_price_accepts_known_shapes() {
        assert_eq!(extract_price(&json!({"last": "50000.5"})), Some(dec!(50000.5)));
        assert_eq!(extract_price(&json!({"data": {"last_price": 42}})), Some(dec!(42)));
        assert_eq!(extract_price(&json!([{"price": "0.25"}])), Some(dec!(0.25)));
        assert_eq!(extract_price(&json!({"data": {"volume": "1"}})), None);
        assert_eq!(extract_price(&json!("50000")), None);
    }

    #[tokio::test]
    async fn identity_pair_is_one_without_a_request() {
        let transport = Arc::new(RoutedTransport::new());
        let price = resolver(&transport).get_market_price("eur", "EUR").await;

        assert_eq!(price, Decimal::ONE);
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn pseudo_assets_are_zero_without_a_request() {
        let transport = Arc::new(RoutedTransport::new());
        let resolver = resolver(&transport);

        for symbol in ["", "STAKED-ETH", "VERYLONGTOKEN", "BTC.B"] {
            assert_eq!(resolver.get_market_price(symbol, "EUR").await, Decimal::ZERO);
        }
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn ticker_price_is_returned() {
        let transport = Arc::new(RoutedTransport::new().route(
            &ticker_path("BTC", "EUR"),
            fixtures::ok(&ticker("50000")),
        ));
        let price = resolver(&transport).get_market_price("btc", "eur").await;

        assert_eq!(price, dec!(50000));
        assert_eq!(transport.hits(&ticker_path("BTC", "EUR")), 1);
    }

    #[tokio::test]
    async fn upstream_failure_is_zero() {
        let transport = Arc::new(
            RoutedTransport::new()
                .route(&ticker_path("XYZ", "EUR"), fixtures::error(404, "unknown pair")),
        );
        assert_eq!(resolver(&transport).get_market_price("XYZ", "EUR").await, Decimal::ZERO);
    }

    #[tokio::test]
    async fn unparseable_price_is_zero() {
        let transport = Arc::new(RoutedTransport::new().route(
            &ticker_path("BTC", "EUR"),
            fixtures::ok(&ticker("n/a")),
        ));
        assert_eq!(resolver(&transport).get_market_price("BTC", "EUR").await, Decimal::ZERO);
    }

    #[tokio::test]
    async fn cached_price_skips_the_second_request() {
        let transport = Arc::new(RoutedTransport::new().route(
            &ticker_path("ETH", "EUR"),
            fixtures::ok(&ticker("3000")),
        ));
        let cache = Arc::new(ResponseCache::new(10));
        let resolver = resolver(&transport).with_cache(Arc::clone(&cache));

        assert_eq!(resolver.get_market_price("ETH", "EUR").await, dec!(3000));
        assert_eq!(resolver.get_market_price("ETH", "EUR").await, dec!(3000));

        assert_eq!(transport.requests().len(), 1);
        assert_eq!(cache.get("ticker:ETH-EUR"), Some(json!("3000")));
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let transport = Arc::new(RoutedTransport::new().route(
            &ticker_path("ETH", "EUR"),
            fixtures::error(503, "down"),
        ));
        let cache = Arc::new(ResponseCache::new(10));
        let resolver = resolver(&transport).with_cache(Arc::clone(&cache));

        resolver.get_market_price("ETH", "EUR").await;
        resolver.get_market_price("ETH", "EUR").await;

        assert_eq!(transport.requests().len(), 2);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn resolve_all_keys_by_input_symbol() {
        let transport = Arc::new(
            RoutedTransport::new()
                .route(&ticker_path("BTC", "EUR"), fixtures::ok(&ticker("50000")))
                .route(&ticker_path("ETH", "EUR"), fixtures::ok(&ticker("3000"))),
        );
        let symbols = vec!["BTC".to_string(), "ETH".to_string(), "EUR".to_string()];
        let prices = resolver(&transport).resolve_all(&symbols, "EUR").await;

        assert_eq!(prices.len(), 3);
        assert_eq!(prices["BTC"], dec!(50000));
        assert_eq!(prices["ETH"], dec!(3000));
        assert_eq!(prices["EUR"], Decimal::ONE);
    }
}
