//! Portfolio valuation configuration.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Valuation defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct PortfolioConfig {
    /// Quote currency used when the caller does not name one.
    #[serde(default = "default_quote")]
    pub quote: String,
    /// Lines worth less than this (in quote currency) are hidden from the
    /// breakdown but still counted in the total.
    #[serde(default = "default_dust_threshold")]
    pub dust_threshold: Decimal,
    /// Timeout for each sub-ledger fetch (milliseconds).
    #[serde(default = "default_branch_timeout_ms")]
    pub branch_timeout_ms: u64,
}

fn default_quote() -> String {
    "EUR".into()
}

fn default_dust_threshold() -> Decimal {
    Decimal::new(1, 2) // 0.01
}

const fn default_branch_timeout_ms() -> u64 {
    15_000
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            quote: default_quote(),
            dust_threshold: default_dust_threshold(),
            branch_timeout_ms: default_branch_timeout_ms(),
        }
    }
}
