//! Command-line interface definitions.
//!
//! Defines the CLI structure for the ledgerline binary using `clap`. Every
//! subcommand prints a single pretty JSON document on stdout.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Authenticated exchange client and portfolio valuation CLI
#[derive(Parser, Debug)]
#[command(name = "ledgerline")]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file (defaults apply when it is missing)
    #[arg(long, global = true, default_value = "ledgerline.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send one signed request and print the JSON response
    Request(RequestArgs),

    /// Print the unit price of an asset
    Price(PriceArgs),

    /// Value every sub-ledger balance in one quote currency
    Portfolio(PortfolioArgs),
}

/// Arguments for `ledgerline request`.
#[derive(Args, Debug)]
pub struct RequestArgs {
    /// HTTP method (GET, POST, PUT, DELETE, ...)
    pub method: String,

    /// Request path, e.g. /v1/wallet/pockets
    pub path: String,

    /// Query parameter as key=value; repeatable, sent in the given order
    #[arg(long = "param", value_parser = parse_param)]
    pub params: Vec<(String, String)>,

    /// JSON object sent as the request body
    #[arg(long)]
    pub body: Option<String>,

    /// Per-attempt timeout in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,
}

/// Arguments for `ledgerline price`.
#[derive(Args, Debug)]
pub struct PriceArgs {
    /// Asset symbol, e.g. BTC
    pub symbol: String,

    /// Quote currency [default: from config]
    #[arg(long)]
    pub quote: Option<String>,
}

/// Arguments for `ledgerline portfolio`.
#[derive(Args, Debug)]
pub struct PortfolioArgs {
    /// Quote currency [default: from config]
    #[arg(long)]
    pub quote: Option<String>,
}

/// Parse a `key=value` query parameter.
fn parse_param(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got `{raw}`")),
    }
}
