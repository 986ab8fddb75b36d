//! Balance records produced by the sub-ledger sources.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::money::Amount;

/// Balance-bearing sub-ledger of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Service {
    /// Simple wallet pockets.
    Wallet,
    /// Trading (pro) account balances.
    Pro,
    /// Staking and earn positions.
    Earn,
    /// Collateral locked as loan guarantee.
    LoanGuarantee,
}

impl Service {
    /// All sources, in fan-out order.
    pub const ALL: [Self; 4] = [Self::Wallet, Self::Pro, Self::Earn, Self::LoanGuarantee];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Wallet => "wallet",
            Self::Pro => "pro",
            Self::Earn => "earn",
            Self::LoanGuarantee => "loan-guarantee",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One asset balance reported by one source.
///
/// `symbol` is kept exactly as the source reported it (trimmed only).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceRecord {
    pub symbol: String,
    pub amount: Amount,
    pub service: Service,
}

impl BalanceRecord {
    #[must_use]
    pub fn new(symbol: impl Into<String>, amount: Amount, service: Service) -> Self {
        Self {
            symbol: symbol.into().trim().to_string(),
            amount,
            service,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn service_serializes_kebab_case() {
        let json = serde_json::to_string(&Service::LoanGuarantee).unwrap();
        assert_eq!(json, "\"loan-guarantee\"");
        assert_eq!(Service::LoanGuarantee.to_string(), "loan-guarantee");
    }

    #[test]
    fn record_trims_but_keeps_case() {
        let record = BalanceRecord::new(" btc ", dec!(1), Service::Wallet);
        assert_eq!(record.symbol, "btc");
    }
}
