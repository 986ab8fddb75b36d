//! Unit price lookup against the exchange ticker.

mod resolver;

pub use resolver::{PriceResolver, TICKER_PATH};
