//! Sub-ledger balance endpoints and their response shapes.
//!
//! Each source reports balances in its own shape; everything is converted to
//! [`BalanceRecord`]s here. Payloads may arrive bare or wrapped in
//! `{"data": ...}`.

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::client::ExchangeClient;
use crate::domain::{parse_amount, BalanceRecord, Service};
use crate::error::ApiError;

pub const WALLET_POCKETS_PATH: &str = "/v1/wallet/pockets";
pub const PRO_BALANCES_PATH: &str = "/v1/pro/balances";
pub const EARN_POSITIONS_PATH: &str = "/v1/earn/positions";
pub const LOANS_PATH: &str = "/v1/loans";

/// Endpoint listing balances for `service`.
#[must_use]
pub const fn endpoint(service: Service) -> &'static str {
    match service {
        Service::Wallet => WALLET_POCKETS_PATH,
        Service::Pro => PRO_BALANCES_PATH,
        Service::Earn => EARN_POSITIONS_PATH,
        Service::LoanGuarantee => LOANS_PATH,
    }
}

#[derive(Debug, Deserialize)]
struct WalletPocket {
    symbol: String,
    balance: Value,
}

#[derive(Debug, Deserialize)]
struct ProBalance {
    currency: String,
    #[serde(default)]
    available: Value,
    #[serde(default)]
    locked: Value,
}

#[derive(Debug, Deserialize)]
struct EarnPosition {
    asset: String,
    amount: Value,
}

#[derive(Debug, Deserialize)]
struct LoanCollateral {
    collateral_symbol: String,
    collateral_amount: Value,
}

/// Return the payload inside a `{"data": ...}` envelope, or the value itself.
#[must_use]
pub fn unwrap_data(value: &Value) -> &Value {
    match value {
        Value::Object(map) => map.get("data").unwrap_or(value),
        _ => value,
    }
}

fn entry<T: DeserializeOwned>(service: Service, item: &Value) -> Option<T> {
    match T::deserialize(item) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            debug!(service = %service, error = %err, "Skipping malformed balance entry");
            None
        }
    }
}

fn record(service: Service, symbol: String, amount: Option<Decimal>) -> Option<BalanceRecord> {
    match amount {
        Some(amount) => Some(BalanceRecord::new(symbol, amount, service)),
        None => {
            debug!(
                service = %service,
                symbol = %symbol,
                "Skipping balance with unparseable amount"
            );
            None
        }
    }
}

/// Convert one source's raw payload into balance records.
///
/// # Errors
///
/// Returns [`ApiError::Upstream`] when the payload is not a list.
pub fn parse_records(service: Service, payload: &Value) -> Result<Vec<BalanceRecord>, ApiError> {
    let items = match unwrap_data(payload) {
        Value::Array(items) => items,
        Value::Null => return Ok(Vec::new()),
        _ => {
            return Err(ApiError::Upstream {
                status: None,
                message: format!("unexpected {service} payload shape"),
            })
        }
    };

    let records = items.iter().filter_map(|item| match service {
        Service::Wallet => entry::<WalletPocket>(service, item)
            .and_then(|p| record(service, p.symbol, parse_amount(&p.balance))),
        Service::Pro => entry::<ProBalance>(service, item).and_then(|b| {
            let amount = match (parse_amount(&b.available), parse_amount(&b.locked)) {
                (None, None) => None,
                (available, locked) => available
                    .unwrap_or_default()
                    .checked_add(locked.unwrap_or_default()),
            };
            record(service, b.currency, amount)
        }),
        Service::Earn => entry::<EarnPosition>(service, item)
            .and_then(|p| record(service, p.asset, parse_amount(&p.amount))),
        Service::LoanGuarantee => entry::<LoanCollateral>(service, item).and_then(|l| {
            record(service, l.collateral_symbol, parse_amount(&l.collateral_amount))
        }),
    });

    Ok(records.collect())
}

/// Fetch and parse balances for one source.
///
/// # Errors
///
/// Propagates the client's classified error or a payload shape error.
pub async fn fetch_balances(
    client: &ExchangeClient,
    service: Service,
) -> Result<Vec<BalanceRecord>, ApiError> {
    let payload = client.get(endpoint(service), &[]).await?;
    parse_records(service, &payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn wallet_pockets_parse() {
        let payload = json!([
            {"symbol": "BTC", "balance": "0.5"},
            {"symbol": "EUR", "balance": 100}
        ]);
        let records = parse_records(Service::Wallet, &payload).unwrap();
        assert_eq!(
            records,
            vec![
                BalanceRecord::new("BTC", dec!(0.5), Service::Wallet),
                BalanceRecord::new("EUR", dec!(100), Service::Wallet),
            ]
        );
    }

    #[test]
    fn pro_balances_sum_available_and_locked() {
        let payload = json!({"data": [
            {"currency": "ETH", "available": "1.5", "locked": "0.5"},
            {"currency": "BTC", "available": "1.0"}
        ]});
        let records = parse_records(Service::Pro, &payload).unwrap();
        assert_eq!(records[0].amount, dec!(2.0));
        assert_eq!(records[1].amount, dec!(1.0));
    }

    #[test]
    fn pro_balance_overflow_skips_only_that_entry() {
        let max = Decimal::MAX.to_string();
        let payload = json!([
            {"currency": "BTC", "available": max, "locked": max},
            {"currency": "ETH", "available": "3", "locked": "1"}
        ]);
        let records = parse_records(Service::Pro, &payload).unwrap();
        assert_eq!(records, vec![BalanceRecord::new("ETH", dec!(4), Service::Pro)]);
    }

    #[test]
    fn earn_and_loan_shapes_parse() {
        let earn =
            parse_records(Service::Earn, &json!([{"asset": "DOT", "amount": "10"}])).unwrap();
        assert_eq!(earn, vec![BalanceRecord::new("DOT", dec!(10), Service::Earn)]);

        let loans = parse_records(
            Service::LoanGuarantee,
            &json!([{"collateral_symbol": "BTC", "collateral_amount": "0.1"}]),
        )
        .unwrap();
        assert_eq!(loans, vec![BalanceRecord::new("BTC", dec!(0.1), Service::LoanGuarantee)]);
    }

    #[test]
    fn malformed_entries_are_skipped() {
        let payload = json!([
            {"symbol": "BTC", "balance": "abc"},
            {"wrong": "shape"},
            {"symbol": "ETH", "balance": "2"}
        ]);
        let records = parse_records(Service::Wallet, &payload).unwrap();
        assert_eq!(records, vec![BalanceRecord::new("ETH", dec!(2), Service::Wallet)]);
    }

    #[test]
    fn null_payload_is_empty() {
        assert!(parse_records(Service::Earn, &Value::Null).unwrap().is_empty());
    }

    #[test]
    fn non_list_payload_is_an_error() {
        let err = parse_records(Service::Wallet, &json!({"data": "nope"})).unwrap_err();
        assert!(matches!(err, ApiError::Upstream { .. }));
    }
}
