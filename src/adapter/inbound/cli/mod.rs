//! CLI module graph and command dispatch.

pub mod command;
pub mod output;
pub mod portfolio;
pub mod price;
pub mod request;

use std::sync::Arc;

use serde_json::Value;

pub use command::{Cli, Commands};

use crate::adapter::outbound::exchange::ExchangeClient;
use crate::application::cache::ResponseCache;
use crate::application::portfolio::PortfolioAggregator;
use crate::application::pricing::PriceResolver;
use crate::error::Result;
use crate::infrastructure::config::{Config, Credentials};

/// Services wired from configuration and environment credentials.
///
/// The response cache lives for one process, so in the CLI it only saves
/// repeated lookups within a single command. `[cache] capacity` bounds it
/// there and matters for embedders that keep a [`PriceResolver`] alive.
struct Services {
    client: Arc<ExchangeClient>,
    prices: PriceResolver,
}

impl Services {
    fn build(config: &Config) -> Result<Self> {
        let credentials = Credentials::from_env()?;
        let client = Arc::new(ExchangeClient::from_config(&config.gateway, &credentials));
        let prices = PriceResolver::new(Arc::clone(&client)).with_cache(command_cache(config));
        Ok(Self { client, prices })
    }
}

fn command_cache(config: &Config) -> Arc<ResponseCache> {
    Arc::new(ResponseCache::from_config(&config.cache))
}

/// Run one command and return the JSON document to print.
///
/// # Errors
///
/// Returns missing credentials, bad arguments and exchange failures; the
/// caller renders them with [`output::failure`].
pub async fn execute(command: &Commands, config: &Config) -> Result<Value> {
    let services = Services::build(config)?;

    match command {
        Commands::Request(args) => request::execute(&services.client, args).await,
        Commands::Price(args) => {
            let quote = args.quote.as_deref().unwrap_or(&config.portfolio.quote);
            Ok(price::execute(&services.prices, args, quote).await)
        }
        Commands::Portfolio(args) => {
            let quote = args.quote.as_deref().unwrap_or(&config.portfolio.quote);
            let aggregator =
                PortfolioAggregator::new(services.client, services.prices, &config.portfolio);
            portfolio::execute(&aggregator, quote).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_cache_uses_configured_capacity() {
        let config = Config::parse_toml("[cache]\ncapacity = 25\n").unwrap();
        let cache = command_cache(&config);
        assert_eq!(cache.capacity(), 25);
        assert!(cache.is_empty());
    }
}
