//! Application services (use cases).
//!
//! These services orchestrate domain logic and coordinate the exchange
//! adapter to implement price lookup and portfolio valuation.

pub mod cache;
pub mod portfolio;
pub mod pricing;
