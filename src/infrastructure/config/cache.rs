//! Response cache configuration.

use serde::Deserialize;

/// In-memory response cache settings.
///
/// The cache is per process; nothing is persisted between CLI runs.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of entries before bulk eviction kicks in.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

const fn default_capacity() -> usize {
    1000
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
        }
    }
}
