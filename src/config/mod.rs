//! Configuration
//!
//! This module handles:
//! - Project-level configuration (`cpts.toml`, `composer.json` `extra.cpts`)
//! - Metric weight overrides and the trusted-package list
//! - Environment overrides (`GITHUB_TOKEN`, `CPTS_DISABLE`)

mod env;
mod project_config;

pub use env::{github_token, is_disabled, parse_env_value};
pub use project_config::{
    load_config, save_trusted_packages, CptsConfig, CONFIG_FILE, DEFAULT_MIN_CPTS,
};
