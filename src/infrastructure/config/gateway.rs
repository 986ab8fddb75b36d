//! Exchange gateway connection and retry configuration.

use serde::Deserialize;

/// Gateway endpoint, timeout and retry settings.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Base URL every request path is appended to.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-attempt timeout when the caller does not pass one (milliseconds).
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Retries after the first attempt for 429 and transient network failures.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Backoff base; doubled per attempt (milliseconds).
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Backoff ceiling, jitter included (milliseconds).
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    /// Upper bound of the random jitter added to each backoff (milliseconds).
    #[serde(default = "default_max_jitter_ms")]
    pub max_jitter_ms: u64,
}

fn default_base_url() -> String {
    "https://api.exchange.example".into()
}

const fn default_timeout_ms() -> u64 {
    30_000
}

const fn default_max_retries() -> u32 {
    3
}

const fn default_base_delay_ms() -> u64 {
    1000
}

const fn default_max_backoff_ms() -> u64 {
    10_000
}

const fn default_max_jitter_ms() -> u64 {
    1000
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            max_jitter_ms: default_max_jitter_ms(),
        }
    }
}
