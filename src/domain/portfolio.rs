//! Portfolio valuation output types.
//!
//! Every numeric field is already smart-rounded to a display string; the
//! decimal arithmetic happens before these types are built.

use std::collections::BTreeMap;

use serde::Serialize;

use super::balance::Service;

/// One displayed asset in a valuation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortfolioLine {
    pub symbol: String,
    pub balance: String,
    pub price: String,
    pub converted_balance: String,
}

/// Result of a portfolio valuation.
///
/// `total_value` covers every priced symbol, dust included, so it is
/// generally not equal to the sum of `breakdown`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortfolioResult {
    pub quote_symbol: String,
    pub total_value: String,
    pub service_subtotals: BTreeMap<Service, String>,
    pub breakdown: Vec<PortfolioLine>,
    /// Sources whose fetch failed or timed out and were valued as empty.
    pub degraded_sources: Vec<Service>,
}

impl PortfolioResult {
    /// Line for `symbol`, if it made it past the dust filter.
    #[must_use]
    pub fn line(&self, symbol: &str) -> Option<&PortfolioLine> {
        self.breakdown.iter().find(|line| line.symbol == symbol)
    }
}
