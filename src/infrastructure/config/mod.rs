//! Infrastructure configuration modules.

pub mod cache;
pub mod credentials;
pub mod gateway;
pub mod logging;
pub mod portfolio;
pub mod settings;

pub use cache::CacheConfig;
pub use credentials::Credentials;
pub use gateway::GatewayConfig;
pub use logging::LoggingConfig;
pub use portfolio::PortfolioConfig;
pub use settings::Config;
