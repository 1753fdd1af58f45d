//! Trust metrics
//!
//! Each metric turns a [`PackageInfo`] into a normalized `[0, 1]` signal.
//! Metrics are pure: they read the snapshot, never fetch.
//!
//! # Default weights
//!
//! ```text
//! airs              3.0   (lower AI-workflow risk is better)
//! activity          4.0
//! committers        5.0
//! stars             1.0
//! dependents        2.0
//! repo_age          2.0
//! hygiene           1.0
//! issue_behaviour   4.0
//! dependency_count  3.0   (fewer is better)
//! ```

mod activity;
mod airs;
mod committers;
mod dependency_count;
mod dependents;
mod hygiene;
mod issue_behaviour;
mod registry;
mod repo_age;
mod stars;

pub use activity::ActivityMetric;
pub use airs::AirsMetric;
pub use committers::CommittersMetric;
pub use dependency_count::DependencyCountMetric;
pub use dependents::DependentsMetric;
pub use hygiene::HygieneMetric;
pub use issue_behaviour::IssueBehaviourMetric;
pub use registry::{MetricRegistry, WeightedMetric};
pub use repo_age::RepoAgeMetric;
pub use stars::StarsMetric;

use crate::error::CptsResult;
use crate::package::PackageInfo;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde_json::Value;

/// Trait implemented by every trust metric
pub trait Metric: Send + Sync {
    /// Stable identifier, also the key for weight overrides
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn default_weight(&self) -> f64;

    /// Icon shown next to the metric in detailed output
    fn emoji(&self) -> &'static str {
        "•"
    }

    /// Inapplicable metrics are skipped entirely and contribute nothing
    fn is_applicable(&self, _package: &PackageInfo) -> bool {
        true
    }

    /// Direction of the underlying raw signal
    ///
    /// The normalized value is always "higher is better"; this only
    /// describes what the raw numbers mean.
    fn higher_is_better(&self) -> bool {
        true
    }

    /// Compute the normalized value with "now" fixed at `now`
    fn measure(&self, package: &PackageInfo, now: DateTime<Utc>) -> CptsResult<Measurement>;
}

/// Output of [`Metric::measure`] before weighting
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Measurement {
    pub normalized: f64,
    /// Diagnostic values, in insertion order
    pub raw: IndexMap<String, Value>,
}

impl Measurement {
    pub fn new(normalized: f64) -> Self {
        Self {
            normalized,
            raw: IndexMap::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.raw.insert(key.to_string(), value.into());
        self
    }
}

/// `min(log10(n + 1) / 4, 1)`: 0 maps to 0, 9999 and above map to 1
pub(crate) fn log_scale(count: u64) -> f64 {
    ((count as f64 + 1.0).log10() / 4.0).min(1.0)
}

/// Round for display in raw diagnostics
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
