//! Ledgerline - resilient exchange REST client and portfolio valuation.
//!
//! This crate talks to an exchange's authenticated REST gateway and values an
//! account across its sub-ledgers (wallet, pro trading, earn, loan
//! collateral) in a single quote currency.
//!
//! # Architecture
//!
//! The crate follows a hexagonal layout:
//!
//! - **`domain`** - Balances, symbols, money parsing and display rounding
//! - **`port`** - The HTTP [`Transport`](port::outbound::Transport) seam
//! - **`adapter::outbound::exchange`** - Request signing, nonces, the retry
//!   state machine and the authenticated client
//! - **`application`** - Response cache, price resolver, portfolio aggregator
//! - **`adapter::inbound::cli`** - The `ledgerline` command line
//! - **`infrastructure::config`** - TOML configuration, credentials, logging
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use ledgerline::adapter::outbound::exchange::ExchangeClient;
//! use ledgerline::application::portfolio::PortfolioAggregator;
//! use ledgerline::application::pricing::PriceResolver;
//! use ledgerline::infrastructure::config::{Config, Credentials};
//!
//! # async fn run() -> ledgerline::error::Result<()> {
//! let config = Config::default();
//! let credentials = Credentials::from_env()?;
//! let client = Arc::new(ExchangeClient::from_config(&config.gateway, &credentials));
//! let prices = PriceResolver::new(Arc::clone(&client));
//! let aggregator = PortfolioAggregator::new(client, prices, &config.portfolio);
//!
//! let portfolio = aggregator.compute_portfolio_valuation("EUR").await?;
//! println!("{}", portfolio.total_value);
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
