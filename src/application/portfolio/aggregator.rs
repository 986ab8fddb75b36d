//! Concurrent fan-out over the sub-ledgers and portfolio valuation.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use rust_decimal::Decimal;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::valuation::{value_portfolio, SourceBalances, ValuationInput};
use crate::adapter::outbound::exchange::ledger::fetch_balances;
use crate::adapter::outbound::exchange::ExchangeClient;
use crate::application::pricing::PriceResolver;
use crate::domain::symbol::normalize;
use crate::domain::{BalanceRecord, PortfolioResult, Service};
use crate::error::{ApiError, Result};
use crate::infrastructure::config::PortfolioConfig;

/// How one source fetch settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOutcome {
    Loaded(Vec<BalanceRecord>),
    /// The fetch errored or timed out; the reason is for logs only.
    Failed(String),
}

/// Settled result of one source fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReport {
    pub service: Service,
    pub outcome: SourceOutcome,
}

/// Values an account across every sub-ledger in one quote currency.
///
/// Source fetches run concurrently, each under its own timeout; a source
/// that fails is valued as empty and reported in `degraded_sources` rather
/// than failing the whole valuation.
#[derive(Debug, Clone)]
pub struct PortfolioAggregator {
    client: Arc<ExchangeClient>,
    prices: PriceResolver,
    dust_threshold: Decimal,
    branch_timeout: Duration,
}

impl PortfolioAggregator {
    #[must_use]
    pub fn new(
        client: Arc<ExchangeClient>,
        prices: PriceResolver,
        config: &PortfolioConfig,
    ) -> Self {
        Self {
            client,
            prices,
            dust_threshold: config.dust_threshold,
            branch_timeout: Duration::from_millis(config.branch_timeout_ms),
        }
    }

    /// Fetch every source concurrently and wait for all of them to settle.
    ///
    /// Reports come back in [`Service::ALL`] order.
    pub async fn fetch_sources(&self) -> Vec<SourceReport> {
        let branches = Service::ALL.into_iter().map(|service| async move {
            let outcome =
                match timeout(self.branch_timeout, fetch_balances(&self.client, service)).await {
                    Ok(Ok(records)) => {
                        debug!(service = %service, records = records.len(), "Source loaded");
                        SourceOutcome::Loaded(records)
                    }
                    Ok(Err(err)) => SourceOutcome::Failed(err.to_string()),
                    Err(_) => SourceOutcome::Failed(format!(
                        "timed out after {} ms",
                        self.branch_timeout.as_millis()
                    )),
                };
            SourceReport { service, outcome }
        });
        join_all(branches).await
    }

    /// Value the whole account in `quote`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for a blank quote and
    /// [`Error::Valuation`](crate::error::Error::Valuation) on arithmetic
    /// overflow. Source and price failures never surface here.
    pub async fn compute_portfolio_valuation(&self, quote: &str) -> Result<PortfolioResult> {
        let quote = normalize(quote);
        if quote.is_empty() {
            return Err(ApiError::Validation("quote symbol must not be empty".into()).into());
        }

        let mut sources = Vec::with_capacity(Service::ALL.len());
        let mut degraded_sources = Vec::new();
        for report in self.fetch_sources().await {
            let records = match report.outcome {
                SourceOutcome::Loaded(records) => records,
                SourceOutcome::Failed(reason) => {
                    warn!(
                        service = %report.service,
                        reason = %reason,
                        "Source unavailable, valuing as empty"
                    );
                    degraded_sources.push(report.service);
                    Vec::new()
                }
            };
            sources.push(SourceBalances {
                service: report.service,
                records,
            });
        }

        let mut symbols: Vec<String> = sources
            .iter()
            .flat_map(|source| source.records.iter().map(|r| normalize(&r.symbol)))
            .collect();
        symbols.sort();
        symbols.dedup();

        let prices = self.prices.resolve_all(&symbols, &quote).await;

        let result = value_portfolio(ValuationInput {
            quote: &quote,
            sources: &sources,
            prices: &prices,
            dust_threshold: self.dust_threshold,
            degraded_sources,
        })?;

        info!(
            quote = %result.quote_symbol,
            total = %result.total_value,
            lines = result.breakdown.len(),
            degraded = result.degraded_sources.len(),
            "Portfolio valued"
        );
        Ok(result)
    }
}
