//! Response cache interface
//!
//! Clients cache decoded DTOs as JSON values keyed by endpoint, so a
//! backend only ever stores `serde_json::Value`.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Common interface for response caches
pub trait Cache: Send + Sync {
    /// Name of this cache backend (for logging)
    fn name(&self) -> &str;

    /// Fresh value for `key`, `None` when missing or expired
    fn get(&self, key: &str) -> Option<Value>;

    fn set(&self, key: &str, value: Value, ttl: Duration);

    fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    fn delete(&self, key: &str);

    fn clear(&self);

    /// Value for `key` ignoring expiry
    fn get_stale(&self, key: &str) -> Option<Value>;
}

/// Typed read; an entry that no longer matches `T` counts as a miss.
pub fn get_typed<T: DeserializeOwned>(cache: &dyn Cache, key: &str) -> Option<T> {
    let value = cache.get(key)?;
    match serde_json::from_value(value) {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::debug!("Discarding cache entry {}: {}", key, e);
            None
        }
    }
}

/// Typed write; values that fail to serialize are skipped.
pub fn set_typed<T: Serialize>(cache: &dyn Cache, key: &str, value: &T, ttl: Duration) {
    match serde_json::to_value(value) {
        Ok(v) => cache.set(key, v, ttl),
        Err(e) => tracing::debug!("Not caching {}: {}", key, e),
    }
}

/// Cache that never stores anything (`--no-cache`)
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCache;

impl Cache for NullCache {
    fn name(&self) -> &str {
        "null"
    }

    fn get(&self, _key: &str) -> Option<Value> {
        None
    }

    fn set(&self, _key: &str, _value: Value, _ttl: Duration) {}

    fn delete(&self, _key: &str) {}

    fn clear(&self) {}

    fn get_stale(&self, _key: &str) -> Option<Value> {
        None
    }
}
