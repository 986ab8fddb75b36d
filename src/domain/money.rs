//! Monetary types, amount parsing and display rounding.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;

/// Price represented as a Decimal for precision.
pub type Price = Decimal;

/// Balance amount represented as a Decimal for precision.
pub type Amount = Decimal;

/// Parse an amount the exchange sent either as a decimal string or as a
/// JSON number.
///
/// Returns `None` for anything else, including strings that are not
/// decimals.
#[must_use]
pub fn parse_amount(value: &Value) -> Option<Decimal> {
    match value {
        Value::String(s) => parse_decimal_str(s.trim()),
        Value::Number(n) => parse_decimal_str(&n.to_string()),
        _ => None,
    }
}

fn parse_decimal_str(s: &str) -> Option<Decimal> {
    if s.is_empty() {
        return None;
    }
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

/// Format a value with the magnitude-dependent display policy.
///
/// `|v| >= 1` keeps 2 decimals, `0.1 <= |v| < 1` keeps 4, anything smaller
/// keeps 8. Zero renders as `"0"`. Midpoints round away from zero.
#[must_use]
pub fn smart_round(value: Decimal) -> String {
    if value.is_zero() {
        return "0".to_string();
    }

    let magnitude = value.abs();
    let places = if magnitude >= Decimal::ONE {
        2
    } else if magnitude >= Decimal::new(1, 1) {
        4
    } else {
        8
    };

    let rounded = value.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.*}", places as usize, rounded)
}
