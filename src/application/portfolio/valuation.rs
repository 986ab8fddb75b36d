//! Pure valuation over fetched balances and resolved prices.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use tracing::warn;

use crate::domain::symbol::normalize;
use crate::domain::{
    smart_round, Amount, BalanceRecord, PortfolioLine, PortfolioResult, Price, Service,
};
use crate::error::{Error, Result};

/// Records fetched from one source. Failed sources carry no records.
#[derive(Debug, Clone)]
pub struct SourceBalances {
    pub service: Service,
    pub records: Vec<BalanceRecord>,
}

/// Everything needed to value a portfolio once prices are known.
#[derive(Debug)]
pub struct ValuationInput<'a> {
    pub quote: &'a str,
    pub sources: &'a [SourceBalances],
    /// Prices keyed by normalized symbol.
    pub prices: &'a HashMap<String, Price>,
    pub dust_threshold: Decimal,
    pub degraded_sources: Vec<Service>,
}

fn overflow(what: &str, symbol: &str) -> Error {
    Error::Valuation(format!("{what} overflowed for {symbol}"))
}

/// Sum amounts per normalized symbol across all sources.
///
/// # Errors
///
/// Returns [`Error::Valuation`] if a sum overflows.
pub fn merge_balances(sources: &[SourceBalances]) -> Result<BTreeMap<String, Amount>> {
    let mut merged: BTreeMap<String, Amount> = BTreeMap::new();
    for record in sources.iter().flat_map(|source| &source.records) {
        let symbol = normalize(&record.symbol);
        let total = merged.entry(symbol.clone()).or_default();
        *total = total
            .checked_add(record.amount)
            .ok_or_else(|| overflow("balance", &symbol))?;
    }
    Ok(merged)
}

/// Value the merged balances and build the display result.
///
/// The total covers every symbol; the breakdown drops zero balances and
/// lines worth less than the dust threshold. Per-service subtotals are
/// computed from each source's records as reported, so a symbol whose
/// casing differs from the merged key finds no price there.
///
/// # Errors
///
/// Returns [`Error::Valuation`] if any product or sum overflows.
pub fn value_portfolio(input: ValuationInput<'_>) -> Result<PortfolioResult> {
    let merged = merge_balances(input.sources)?;

    let mut total = Decimal::ZERO;
    let mut lines: Vec<(Decimal, String, Amount, Price)> = Vec::with_capacity(merged.len());
    for (symbol, amount) in merged {
        let price = input.prices.get(&symbol).copied().unwrap_or_default();
        let value = amount
            .checked_mul(price)
            .ok_or_else(|| overflow("value", &symbol))?;
        total = total
            .checked_add(value)
            .ok_or_else(|| overflow("total", &symbol))?;

        if amount.is_zero() || value < input.dust_threshold {
            continue;
        }
        lines.push((value, symbol, amount, price));
    }

    lines.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));

    let subtotals = service_subtotals(input.sources, input.prices)?;
    let subtotal_sum = subtotals.values().try_fold(Decimal::ZERO, |acc, v| acc.checked_add(*v));
    if subtotal_sum != Some(total) {
        warn!(
            total = %total,
            subtotals = ?subtotal_sum,
            "Per-service subtotals do not add up to the portfolio total"
        );
    }

    Ok(PortfolioResult {
        quote_symbol: normalize(input.quote),
        total_value: smart_round(total),
        service_subtotals: subtotals
            .into_iter()
            .map(|(service, value)| (service, smart_round(value)))
            .collect(),
        breakdown: lines
            .into_iter()
            .map(|(value, symbol, amount, price)| PortfolioLine {
                symbol,
                balance: smart_round(amount),
                price: smart_round(price),
                converted_balance: smart_round(value),
            })
            .collect(),
        degraded_sources: input.degraded_sources,
    })
}

/// Value of each source, looked up by the symbol exactly as it reported it.
///
/// Every service appears in the result; failed sources sum to zero.
fn service_subtotals(
    sources: &[SourceBalances],
    prices: &HashMap<String, Price>,
) -> Result<BTreeMap<Service, Decimal>> {
    let mut subtotals: BTreeMap<Service, Decimal> =
        Service::ALL.iter().map(|service| (*service, Decimal::ZERO)).collect();

    for source in sources {
        let subtotal = subtotals.entry(source.service).or_default();
        for record in &source.records {
            let Some(price) = prices.get(&record.symbol) else {
                continue;
            };
            let value = record
                .amount
                .checked_mul(*price)
                .ok_or_else(|| overflow("subtotal", &record.symbol))?;
            *subtotal = subtotal
                .checked_add(value)
                .ok_or_else(|| overflow("subtotal", &record.symbol))?;
        }
    }
    Ok(subtotals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn source(service: Service, balances: &[(&str, Decimal)]) -> SourceBalances {
        SourceBalances {
            service,
            records: balances
                .iter()
                .map(|(symbol, amount)| BalanceRecord::new(*symbol, *amount, service))
                .collect(),
        }
    }

    fn prices(entries: &[(&str, Decimal)]) -> HashMap<String, Price> {
        entries.iter().map(|(s, p)| ((*s).to_string(), *p)).collect()
    }

    fn value(sources: &[SourceBalances], prices: &HashMap<String, Price>) -> PortfolioResult {
        value_portfolio(ValuationInput {
            quote: "eur",
            sources,
            prices,
            dust_threshold: dec!(0.01),
            degraded_sources: Vec::new(),
        })
        .unwrap()
    }

    #[test]
    fn merge_sums_across_sources_and_casing() {
        let sources = [
            source(Service::Wallet, &[("btc", dec!(0.5))]),
            source(Service::Pro, &[(" BTC ", dec!(1.0)), ("ETH", dec!(2))]),
        ];
        let merged = merge_balances(&sources).unwrap();
        assert_eq!(merged["BTC"], dec!(1.5));
        assert_eq!(merged["ETH"], dec!(2));
    }

    #[test]
    fn merge_overflow_is_an_error() {
        let sources = [
            source(Service::Wallet, &[("BTC", Decimal::MAX)]),
            source(Service::Pro, &[("BTC", Decimal::MAX)]),
        ];
        assert!(matches!(merge_balances(&sources), Err(Error::Valuation(_))));
    }

    #[test]
    fn same_symbol_from_two_sources_is_one_line() {
        let sources = [
            source(Service::Wallet, &[("BTC", dec!(0.5))]),
            source(Service::Pro, &[("BTC", dec!(1.0))]),
        ];
        let result = value(&sources, &prices(&[("BTC", dec!(50000))]));

        assert_eq!(result.quote_symbol, "EUR");
        assert_eq!(result.total_value, "75000.00");
        assert_eq!(result.breakdown.len(), 1);
        let line = result.line("BTC").unwrap();
        assert_eq!(line.balance, "1.50");
        assert_eq!(line.price, "50000.00");
        assert_eq!(line.converted_balance, "75000.00");
        assert_eq!(result.service_subtotals[&Service::Wallet], "25000.00");
        assert_eq!(result.service_subtotals[&Service::Pro], "50000.00");
        assert_eq!(result.service_subtotals[&Service::Earn], "0");
    }

    #[test]
    fn dust_counts_in_total_but_not_breakdown() {
        let sources = [source(
            Service::Wallet,
            &[("BTC", dec!(0.1)), ("SHIB", dec!(100))],
        )];
        let result = value(
            &sources,
            &prices(&[("BTC", dec!(50000)), ("SHIB", dec!(0.00001))]),
        );

        assert_eq!(result.breakdown.len(), 1);
        assert_eq!(result.breakdown[0].symbol, "BTC");
        assert_eq!(result.total_value, "5000.00");
    }

    #[test]
    fn zero_balances_are_hidden() {
        let sources = [source(Service::Wallet, &[("EUR", dec!(0)), ("BTC", dec!(1))])];
        let result = value(&sources, &prices(&[("EUR", dec!(1)), ("BTC", dec!(100))]));
        assert_eq!(result.breakdown.len(), 1);
        assert!(result.line("EUR").is_none());
    }

    #[test]
    fn breakdown_is_sorted_by_value_descending() {
        let sources = [source(
            Service::Wallet,
            &[("ETH", dec!(1)), ("EUR", dec!(10000)), ("BTC", dec!(0.1))],
        )];
        let result = value(
            &sources,
            &prices(&[("ETH", dec!(3000)), ("EUR", dec!(1)), ("BTC", dec!(50000))]),
        );

        let order: Vec<&str> = result.breakdown.iter().map(|l| l.symbol.as_str()).collect();
        assert_eq!(order, ["EUR", "BTC", "ETH"]);
    }

    #[test]
    fn equal_values_are_ordered_by_symbol() {
        let sources = [source(Service::Wallet, &[("ZEC", dec!(1)), ("ADA", dec!(1))])];
        let result = value(&sources, &prices(&[("ZEC", dec!(10)), ("ADA", dec!(10))]));

        let order: Vec<&str> = result.breakdown.iter().map(|l| l.symbol.as_str()).collect();
        assert_eq!(order, ["ADA", "ZEC"]);
    }

    #[test]
    fn lowercase_symbol_is_missing_from_its_subtotal() {
        let sources = [
            source(Service::Wallet, &[("BTC", dec!(1))]),
            source(Service::Earn, &[("btc", dec!(1))]),
        ];
        let result = value(&sources, &prices(&[("BTC", dec!(100))]));

        assert_eq!(result.total_value, "200.00");
        assert_eq!(result.line("BTC").unwrap().converted_balance, "200.00");
        assert_eq!(result.service_subtotals[&Service::Wallet], "100.00");
        assert_eq!(result.service_subtotals[&Service::Earn], "0");
    }

    #[test]
    fn unpriced_symbols_are_worth_zero() {
        let sources = [source(Service::Wallet, &[("XYZ", dec!(5))])];
        let result = value(&sources, &HashMap::new());

        assert_eq!(result.total_value, "0");
        assert!(result.breakdown.is_empty());
    }

    #[test]
    fn small_values_use_more_decimals() {
        let sources = [source(Service::Wallet, &[("DOGE", dec!(2.5))])];
        let result = value(&sources, &prices(&[("DOGE", dec!(0.123456))]));

        let line = result.line("DOGE").unwrap();
        assert_eq!(line.price, "0.1235");
        assert_eq!(line.converted_balance, "0.3086");
    }
}
