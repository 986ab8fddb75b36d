//! Asset symbol helpers.

/// Longest code still treated as a tradeable ticker.
pub const MAX_TICKER_LEN: usize = 10;

/// Normalize a symbol for merging: trimmed and upper-cased.
#[must_use]
pub fn normalize(symbol: &str) -> String {
    symbol.trim().to_ascii_uppercase()
}

/// True when the symbol looks like an internal pseudo-asset with no public
/// market (empty, overlong, or containing anything but ASCII alphanumerics).
#[must_use]
pub fn is_pseudo_asset(symbol: &str) -> bool {
    let symbol = symbol.trim();
    symbol.is_empty()
        || symbol.len() > MAX_TICKER_LEN
        || !symbol.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Trading pair code in the exchange's `BASE-QUOTE` form.
#[must_use]
pub fn pair(base: &str, quote: &str) -> String {
    format!("{}-{}", normalize(base), normalize(quote))
}
