//! Exchange-agnostic domain types: balances, valuations, money.

pub mod balance;
pub mod money;
pub mod portfolio;
pub mod symbol;

pub use balance::{BalanceRecord, Service};
pub use money::{parse_amount, smart_round, Amount, Price};
pub use portfolio::{PortfolioLine, PortfolioResult};
