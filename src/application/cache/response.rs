//! Response cache for idempotent exchange reads.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use tokio::time::Instant;
use tracing::debug;

use crate::infrastructure::config::CacheConfig;

/// What kind of data an entry holds; decides its default TTL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CacheCategory {
    #[default]
    Static,
    MarketData,
    Balance,
    Transaction,
    Order,
    UserData,
}

impl CacheCategory {
    pub const ALL: [Self; 6] = [
        Self::Static,
        Self::MarketData,
        Self::Balance,
        Self::Transaction,
        Self::Order,
        Self::UserData,
    ];

    /// Default time-to-live for entries of this category.
    #[must_use]
    pub const fn ttl(self) -> Duration {
        match self {
            Self::Static => Duration::from_secs(3600),
            Self::MarketData => Duration::from_secs(30),
            Self::Balance | Self::UserData => Duration::from_secs(60),
            Self::Transaction => Duration::from_secs(120),
            Self::Order => Duration::from_secs(15),
        }
    }
}

/// A cached value with its bookkeeping.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub value: T,
    pub category: CacheCategory,
    pub expires_at: Instant,
    pub hits: u64,
    pub last_accessed: Instant,
}

impl<T> CacheEntry<T> {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Snapshot of cache contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub by_category: BTreeMap<CacheCategory, usize>,
    pub total_hits: u64,
    /// Keys plus serialized values, in bytes.
    pub approximate_size_bytes: usize,
}

/// Category-keyed, TTL-bounded in-memory cache of JSON values.
///
/// When a new key is inserted at capacity, the least-recently-accessed 10%
/// of entries are evicted in one pass. Keys are used as given; callers are
/// responsible for building them consistently.
///
/// Lives in process memory only. Instances are meant to be shared through an
/// `Arc` and injected where needed; nothing here is global.
#[derive(Debug)]
pub struct ResponseCache {
    entries: Mutex<HashMap<String, CacheEntry<Value>>>,
    capacity: usize,
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(CacheConfig::default().capacity)
    }
}

impl ResponseCache {
    /// Create a cache holding at most `capacity` entries (minimum 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    #[must_use]
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.capacity)
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Store `value` under `key`, replacing any previous entry.
    ///
    /// `ttl_override` replaces the category's default TTL.
    pub fn set(
        &self,
        key: &str,
        value: Value,
        category: CacheCategory,
        ttl_override: Option<Duration>,
    ) {
        let now = Instant::now();
        let ttl = ttl_override.unwrap_or_else(|| category.ttl());
        let mut entries = self.entries.lock();

        if !entries.contains_key(key) && entries.len() >= self.capacity {
            Self::evict(&mut entries);
        }

        entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                category,
                expires_at: now + ttl,
                hits: 0,
                last_accessed: now,
            },
        );
    }

    /// Return the value under `key` if present and unexpired.
    ///
    /// An expired entry is removed by the read that finds it.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        let now = Instant::now();
        let mut entries = self.entries.lock();

        let entry = entries.get_mut(key)?;
        if entry.is_expired(now) {
            entries.remove(key);
            debug!(key, "Cache entry expired");
            return None;
        }

        entry.hits += 1;
        entry.last_accessed = now;
        Some(entry.value.clone())
    }

    /// Remove one key, or everything when `key` is `None`.
    pub fn clear(&self, key: Option<&str>) {
        let mut entries = self.entries.lock();
        match key {
            Some(key) => {
                entries.remove(key);
            }
            None => entries.clear(),
        }
    }

    /// Remove every entry of `category`; returns how many were removed.
    pub fn clear_by_category(&self, category: CacheCategory) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| entry.category != category);
        before - entries.len()
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.lock();
        let mut by_category: BTreeMap<CacheCategory, usize> =
            CacheCategory::ALL.iter().map(|c| (*c, 0)).collect();
        let mut total_hits = 0;
        let mut approximate_size_bytes = 0;

        for (key, entry) in entries.iter() {
            *by_category.entry(entry.category).or_default() += 1;
            total_hits += entry.hits;
            approximate_size_bytes += key.len() + entry.value.to_string().len();
        }

        CacheStats {
            total_entries: entries.len(),
            by_category,
            total_hits,
            approximate_size_bytes,
        }
    }

    /// Drop the least-recently-accessed tenth of the entries (at least one).
    fn evict(entries: &mut HashMap<String, CacheEntry<Value>>) {
        let count = entries.len().div_ceil(10).max(1);

        let mut by_access: Vec<(Instant, String)> = entries
            .iter()
            .map(|(key, entry)| (entry.last_accessed, key.clone()))
            .collect();
        by_access.sort();

        for (_, key) in by_access.into_iter().take(count) {
            entries.remove(&key);
        }
        debug!(evicted = count, remaining = entries.len(), "Cache evicted entries");
    }
}
