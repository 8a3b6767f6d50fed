//! Persistent keyed cache for crawl checkpoints and balance lookups
//!
//! Each key maps to one JSON document holding a payload, a save timestamp
//! and a completeness flag. Records are valid until the caller chooses not
//! to trust them (the `--no-cache` flag); there is no eviction or TTL.
//! Read and write failures degrade to cache misses and no-ops.

pub mod store;

use chrono::DateTime;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::warn;

pub use store::CacheStore;
pub use store::FileCacheStore;
pub use store::MemoryCacheStore;

/// One cached document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheRecord<T> {
    pub key: String,
    pub payload: T,
    pub saved_at: DateTime<Utc>,
    /// `false` marks an in-progress checkpoint, `true` a finished snapshot
    pub complete: bool,
}

/// Typed cache over a pluggable key-value store
pub struct KeyedCache {
    store: Box<dyn CacheStore>,
}

impl KeyedCache {
    #[must_use]
    pub fn new(store: Box<dyn CacheStore>) -> Self {
        Self { store }
    }

    /// File-backed cache rooted at `dir`
    #[must_use]
    pub fn file(dir: &str) -> Self {
        Self::new(Box::new(FileCacheStore::new(dir)))
    }

    /// Load a record, treating a missing or undeserializable entry as absent
    #[must_use]
    pub fn load_record<T: DeserializeOwned>(&self, key: &str) -> Option<CacheRecord<T>> {
        let contents = self.store.load(key)?;
        match serde_json::from_str(&contents) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Ignoring corrupt cache entry {key}: {e}");
                None
            }
        }
    }

    /// Save a record; I/O and serialization failures are logged, not raised
    pub fn save_record<T: Serialize>(&self, key: &str, payload: &T, complete: bool) {
        let record = CacheRecord {
            key: key.to_string(),
            payload,
            saved_at: Utc::now(),
            complete,
        };
        match serde_json::to_string_pretty(&record) {
            Ok(contents) => {
                if self.store.save(key, &contents) {
                    debug!("Cached {key} (complete: {complete})");
                }
            }
            Err(e) => warn!("Failed to serialize cache entry {key}: {e}"),
        }
    }
}

/// Reduce arbitrary text to a filesystem-safe cache key token
#[must_use]
pub fn sanitize_cache_key(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Cache key for a crawl of the given search text
#[must_use]
pub fn cast_cache_key(search_text: &str) -> String {
    format!("casts_{}", sanitize_cache_key(search_text))
}

/// Cache key for the balance map of the given token
#[must_use]
pub fn balance_cache_key(token_address: &str) -> String {
    format!(
        "balances_{}",
        sanitize_cache_key(&token_address.to_lowercase())
    )
}
