//! CPTS - Composite Package Trust Score
//!
//! Scores a dependency from three families of signals:
//!
//! - source-host history (commits, issues, pull requests, stars, age)
//! - registry adoption (dependents, declared dependencies)
//! - heuristics for AI-generated maintenance patterns
//!
//! The score feeds a pass/fail gate for dependency installation.
//!
//! # Pipeline
//!
//! ```text
//! package name
//!     │
//!     ├── TrustedPackageMatcher ── match ──▶ Trusted (no scoring)
//!     │
//!     ▼
//! PackageResolver ── SourceHost + PackageRegistry ──▶ PackageInfo
//!     │
//!     ▼
//! ScoreCalculator ── MetricRegistry + TrustBonus ──▶ ScoreResult
//! ```
//!
//! # Example
//!
//! ```no_run
//! use cpts::api::github::GitHubClient;
//! use cpts::api::packagist::PackagistClient;
//! use cpts::cache::NullCache;
//! use cpts::config::CptsConfig;
//! use cpts::metrics::MetricRegistry;
//! use cpts::package::PackageResolver;
//! use cpts::scoring::{ScoreCalculator, TrustBonus};
//! use std::sync::Arc;
//!
//! let config = CptsConfig::default();
//! let cache = Arc::new(NullCache);
//! let resolver = PackageResolver::new(
//!     Arc::new(GitHubClient::new(cache.clone(), None)),
//!     Arc::new(PackagistClient::new(cache)),
//! );
//! let calculator = ScoreCalculator::new(MetricRegistry::with_defaults(&config.weights), TrustBonus);
//!
//! let package = resolver.resolve("monolog/monolog")?;
//! let score = calculator.calculate(&package)?;
//! println!("{} {:.1} ({})", score.package, score.score, score.grade());
//! # Ok::<(), cpts::CptsError>(())
//! ```

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod gate;
pub mod lockfile;
pub mod metrics;
pub mod package;
pub mod scoring;

pub use error::{CptsError, CptsResult};
