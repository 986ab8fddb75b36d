//! Runtime caches used by application services.
//!
//! - [`response::ResponseCache`]: category-keyed TTL cache for exchange reads

pub mod response;

pub use response::{CacheCategory, CacheEntry, CacheStats, ResponseCache};
