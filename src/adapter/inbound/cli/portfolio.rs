//! Handler for the `portfolio` command.

use serde_json::Value;

use crate::application::portfolio::PortfolioAggregator;
use crate::error::Result;

/// Execute the portfolio command.
pub async fn execute(aggregator: &PortfolioAggregator, quote: &str) -> Result<Value> {
    let result = aggregator.compute_portfolio_valuation(quote).await?;
    Ok(serde_json::to_value(result)?)
}
