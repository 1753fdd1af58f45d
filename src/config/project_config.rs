//! Project-level configuration (`cpts.toml` or `composer.json` `extra.cpts`)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use crate::cache::project_cache_dir;

pub const CONFIG_FILE: &str = "cpts.toml";
pub const COMPOSER_FILE: &str = "composer.json";
const COMPOSER_EXTRA_KEY: &str = "cpts";

pub const DEFAULT_MIN_CPTS: u32 = 20;

fn default_min_cpts() -> u32 {
    DEFAULT_MIN_CPTS
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CptsConfig {
    /// Minimum acceptable score (0-100)
    #[serde(default = "default_min_cpts")]
    pub min_cpts: u32,

    /// Exact names or `*` globs exempt from scoring
    #[serde(default)]
    pub trusted_packages: Vec<String>,

    /// Per-metric weight overrides
    #[serde(default)]
    pub weights: HashMap<String, f64>,

    /// Response cache directory (default: `<project>/.cpts-cache`)
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,

    /// Seconds; when set, replaces every per-endpoint TTL
    #[serde(default)]
    pub cache_ttl: Option<u64>,
}

impl Default for CptsConfig {
    fn default() -> Self {
        Self {
            min_cpts: DEFAULT_MIN_CPTS,
            trusted_packages: Vec::new(),
            weights: HashMap::new(),
            cache_dir: None,
            cache_ttl: None,
        }
    }
}

impl CptsConfig {
    /// Resolved cache directory; relative paths are taken from the project root
    pub fn cache_dir(&self, project_root: &Path) -> PathBuf {
        match &self.cache_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => project_root.join(dir),
            None => project_cache_dir(project_root),
        }
    }

    pub fn cache_ttl(&self) -> Option<Duration> {
        self.cache_ttl.map(Duration::from_secs)
    }

    /// Drop values that would break score invariants
    pub fn normalize(&mut self) {
        if self.min_cpts > 100 {
            warn!("min_cpts {} is above 100, clamping", self.min_cpts);
            self.min_cpts = 100;
        }
        self.weights.retain(|name, weight| {
            let ok = weight.is_finite() && *weight >= 0.0;
            if !ok {
                warn!("Ignoring invalid weight {} for metric {}", weight, name);
            }
            ok
        });
        self.trusted_packages.retain(|p| !p.trim().is_empty());
    }
}

/// Load configuration for a project
///
/// Searches in this order:
/// 1. `cpts.toml`
/// 2. `composer.json` (`extra.cpts`)
///
/// Returns default configuration if neither is present or readable.
pub fn load_config(project_root: &Path) -> CptsConfig {
    let toml_path = project_root.join(CONFIG_FILE);
    if toml_path.exists() {
        match load_toml_config(&toml_path) {
            Ok(mut config) => {
                debug!("Loaded config from {}", toml_path.display());
                config.normalize();
                return config;
            }
            Err(e) => {
                warn!("Failed to load {}: {}", toml_path.display(), e);
            }
        }
    }

    let composer_path = project_root.join(COMPOSER_FILE);
    if composer_path.exists() {
        match load_composer_config(&composer_path) {
            Ok(Some(mut config)) => {
                debug!("Loaded config from {} (extra.cpts)", composer_path.display());
                config.normalize();
                return config;
            }
            Ok(None) => {}
            Err(e) => {
                warn!("Failed to load {}: {}", composer_path.display(), e);
            }
        }
    }

    debug!("No config found, using defaults");
    CptsConfig::default()
}

fn load_toml_config(path: &Path) -> anyhow::Result<CptsConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: CptsConfig = toml::from_str(&content)?;
    Ok(config)
}

fn load_composer_config(path: &Path) -> anyhow::Result<Option<CptsConfig>> {
    let content = std::fs::read_to_string(path)?;
    let composer: serde_json::Value = serde_json::from_str(&content)?;
    match composer.get("extra").and_then(|e| e.get(COMPOSER_EXTRA_KEY)) {
        Some(section) => Ok(Some(serde_json::from_value(section.clone())?)),
        None => Ok(None),
    }
}

/// Rewrite `trusted_packages` in `cpts.toml`, creating the file when missing.
/// Other keys in the file are preserved.
pub fn save_trusted_packages(project_root: &Path, patterns: &[String]) -> anyhow::Result<PathBuf> {
    let path = project_root.join(CONFIG_FILE);
    let mut table = if path.exists() {
        std::fs::read_to_string(&path)?.parse::<toml::Table>()?
    } else {
        toml::Table::new()
    };
    table.insert(
        "trusted_packages".to_string(),
        toml::Value::Array(patterns.iter().cloned().map(toml::Value::String).collect()),
    );
    std::fs::write(&path, toml::to_string_pretty(&table)?)?;
    Ok(path)
}
