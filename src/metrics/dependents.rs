use super::{log_scale, round_to, Measurement, Metric};
use crate::error::CptsResult;
use crate::package::PackageInfo;
use chrono::{DateTime, Utc};

/// Production adoption: packages on the registry that require this one
pub struct DependentsMetric;

impl Metric for DependentsMetric {
    fn name(&self) -> &'static str {
        "dependents"
    }

    fn description(&self) -> &'static str {
        "Packages that depend on this (production adoption)"
    }

    fn default_weight(&self) -> f64 {
        2.0
    }

    fn emoji(&self) -> &'static str {
        "📦"
    }

    fn is_applicable(&self, package: &PackageInfo) -> bool {
        package.has_registry_data()
    }

    fn measure(&self, package: &PackageInfo, _now: DateTime<Utc>) -> CptsResult<Measurement> {
        let dependents = package.dependents_count();
        Ok(Measurement::new(log_scale(dependents))
            .with("dependents", dependents)
            .with("log_value", round_to((dependents as f64 + 1.0).log10(), 3)))
    }
}
