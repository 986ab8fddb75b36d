//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application settings.
//! Configuration is loaded from a TOML file; API credentials come from the
//! environment (see [`Credentials`](super::Credentials)) and never from the file.
//!
//! # Example
//!
//! ```no_run
//! use ledgerline::infrastructure::config::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use url::Url;

use super::cache::CacheConfig;
use super::gateway::GatewayConfig;
use super::logging::LoggingConfig;
use super::portfolio::PortfolioConfig;
use crate::error::{ConfigError, Result};

/// Main application configuration.
///
/// Every section is optional; missing sections and fields fall back to their
/// defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Exchange endpoint, timeouts and retry behavior.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Response cache sizing.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Portfolio valuation defaults.
    #[serde(default)]
    pub portfolio: PortfolioConfig,

    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML content is
    /// malformed, or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Load from `path` when the file exists, otherwise use defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read or is invalid.
    #[allow(clippy::result_large_err)]
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Initialize the tracing subscriber from the logging section.
    pub fn init_logging(&self) {
        self.logging.init();
    }

    /// Validate configuration values.
    #[allow(clippy::result_large_err)]
    fn validate(&self) -> Result<()> {
        let gateway = &self.gateway;
        if gateway.base_url.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "base_url" }.into());
        }
        Url::parse(&gateway.base_url).map_err(|e| ConfigError::InvalidValue {
            field: "base_url",
            reason: e.to_string(),
        })?;
        if gateway.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "timeout_ms",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if gateway.max_backoff_ms < gateway.base_delay_ms {
            return Err(ConfigError::InvalidValue {
                field: "max_backoff_ms",
                reason: "must be at least base_delay_ms".to_string(),
            }
            .into());
        }
        if self.cache.capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "capacity",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.portfolio.dust_threshold < Decimal::ZERO {
            return Err(ConfigError::InvalidValue {
                field: "dust_threshold",
                reason: "must not be negative".to_string(),
            }
            .into());
        }
        if self.portfolio.branch_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "branch_timeout_ms",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.portfolio.quote.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "quote" }.into());
        }
        Ok(())
    }
}
