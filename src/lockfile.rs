//! `composer.lock` reading

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const LOCK_FILE: &str = "composer.lock";

/// One locked package
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LockedPackage {
    pub name: String,
    #[serde(default)]
    pub version: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LockFile {
    #[serde(default)]
    pub packages: Vec<LockedPackage>,
    #[serde(default, rename = "packages-dev")]
    pub packages_dev: Vec<LockedPackage>,
}

impl LockFile {
    pub fn parse(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Invalid composer.lock")
    }

    /// `None` when the project has no lock file
    pub fn load(project_root: &Path) -> Result<Option<Self>> {
        let path = lock_path(project_root);
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
            .map(Some)
    }

    /// Runtime packages, then dev packages when `include_dev`
    pub fn package_names(&self, include_dev: bool) -> Vec<String> {
        let dev: &[LockedPackage] = if include_dev { &self.packages_dev } else { &[] };
        self.packages
            .iter()
            .chain(dev)
            .map(|p| p.name.clone())
            .collect()
    }
}

pub fn lock_path(project_root: &Path) -> PathBuf {
    project_root.join(LOCK_FILE)
}
