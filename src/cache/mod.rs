//! Response caching for the remote clients
//!
//! - `traits.rs` - the `Cache` interface, typed helpers and `NullCache`
//! - `paths.rs` - cache directory and entry path utilities
//! - this file - `FilesystemCache`, one JSON envelope per key

pub mod paths;
pub mod traits;

pub use paths::{ensure_cache_dir, entry_path, project_cache_dir, user_cache_dir};
pub use traits::{get_typed, set_typed, Cache, NullCache};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Bumped whenever the envelope or DTO layout changes
const CACHE_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    version: u32,
    created_at: i64,
    expires_at: i64,
    value: Value,
}

/// On-disk cache under a single directory
#[derive(Debug, Clone)]
pub struct FilesystemCache {
    dir: PathBuf,
}

impl FilesystemCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read_envelope(&self, key: &str) -> Option<Envelope> {
        let path = entry_path(&self.dir, key);
        let content = std::fs::read_to_string(&path).ok()?;
        let envelope: Envelope = match serde_json::from_str(&content) {
            Ok(e) => e,
            Err(e) => {
                tracing::debug!("Unreadable cache entry {}: {}", path.display(), e);
                return None;
            }
        };
        if envelope.version != CACHE_VERSION {
            return None;
        }
        Some(envelope)
    }
}

impl Cache for FilesystemCache {
    fn name(&self) -> &str {
        "filesystem"
    }

    fn get(&self, key: &str) -> Option<Value> {
        let envelope = self.read_envelope(key)?;
        if envelope.expires_at < Utc::now().timestamp() {
            return None;
        }
        Some(envelope.value)
    }

    fn set(&self, key: &str, value: Value, ttl: Duration) {
        let now = Utc::now().timestamp();
        let envelope = Envelope {
            version: CACHE_VERSION,
            created_at: now,
            expires_at: now.saturating_add(ttl.as_secs() as i64),
            value,
        };
        let path = entry_path(&self.dir, key);
        let result = path
            .parent()
            .map(std::fs::create_dir_all)
            .transpose()
            .and_then(|_| {
                let json = serde_json::to_string(&envelope)?;
                std::fs::write(&path, json)
            });
        if let Err(e) = result {
            tracing::warn!("Failed to write cache entry {}: {}", path.display(), e);
        }
    }

    fn delete(&self, key: &str) {
        let path = entry_path(&self.dir, key);
        if path.exists() {
            if let Err(e) = std::fs::remove_file(&path) {
                tracing::debug!("Failed to delete {}: {}", path.display(), e);
            }
        }
    }

    fn clear(&self) {
        if !self.dir.is_dir() {
            return;
        }
        if let Err(e) = std::fs::remove_dir_all(&self.dir) {
            tracing::warn!("Failed to clear cache {}: {}", self.dir.display(), e);
        }
    }

    fn get_stale(&self, key: &str) -> Option<Value> {
        self.read_envelope(key).map(|e| e.value)
    }
}
