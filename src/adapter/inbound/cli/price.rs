//! Handler for the `price` command.

use serde_json::{json, Value};

use super::command::PriceArgs;
use crate::application::pricing::PriceResolver;
use crate::domain::smart_round;
use crate::domain::symbol::normalize;

/// Execute the price command.
///
/// Never fails: an unknown asset prints a zero price.
pub async fn execute(resolver: &PriceResolver, args: &PriceArgs, quote: &str) -> Value {
    let price = resolver.get_market_price(&args.symbol, quote).await;
    json!({
        "symbol": normalize(&args.symbol),
        "quote": normalize(quote),
        "price": smart_round(price),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::fixtures::{self, ticker, ticker_path};
    use crate::testkit::transport::RoutedTransport;
    use std::sync::Arc;

    #[tokio::test]
    async fn prints_rounded_price() {
        let transport = Arc::new(RoutedTransport::new().route(
            &ticker_path("ETH", "USD"),
            fixtures::ok(&ticker("3120.456")),
        ));
        let resolver = PriceResolver::new(fixtures::client(transport));
        let args = PriceArgs {
            symbol: "eth".into(),
            quote: None,
        };

        let value = execute(&resolver, &args, "usd").await;
        assert_eq!(value, json!({"symbol": "ETH", "quote": "USD", "price": "3120.46"}));
    }
}
