//! Portfolio valuation across the account's sub-ledgers.
//!
//! - [`aggregator`]: concurrent, failure-tolerant source fan-out
//! - [`valuation`]: pure merge, pricing arithmetic and display rounding

pub mod aggregator;
pub mod valuation;

pub use aggregator::{PortfolioAggregator, SourceOutcome, SourceReport};
pub use valuation::{merge_balances, value_portfolio, SourceBalances, ValuationInput};
