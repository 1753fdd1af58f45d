//! Cache path utilities - `<project>/.cpts-cache/<aa>/<sha256>.cache`

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Directory name used inside a project root
pub const PROJECT_CACHE_DIR: &str = ".cpts-cache";

/// Default cache directory for a project.
pub fn project_cache_dir(project_root: &Path) -> PathBuf {
    project_root.join(PROJECT_CACHE_DIR)
}

/// Per-user fallback (~/.cache/cpts on Unix) for when the project directory is not writable.
pub fn user_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| {
            dirs::home_dir()
                .map(|h| h.join(".cache"))
                .unwrap_or_else(|| PathBuf::from("."))
        })
        .join("cpts")
}

/// Hex sha256 of a cache key.
pub fn hash_key(key: &str) -> String {
    format!("{:x}", Sha256::digest(key.as_bytes()))
}

/// File holding the entry for `key`, sharded by the first two hash characters.
pub fn entry_path(cache_dir: &Path, key: &str) -> PathBuf {
    let hash = hash_key(key);
    cache_dir.join(&hash[..2]).join(format!("{hash}.cache"))
}

/// Ensure the cache directory exists.
pub fn ensure_cache_dir(cache_dir: &Path) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(cache_dir)?;
    Ok(cache_dir.to_path_buf())
}
