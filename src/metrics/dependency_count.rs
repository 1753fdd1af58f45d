use super::{Measurement, Metric};
use crate::error::CptsResult;
use crate::package::PackageInfo;
use chrono::{DateTime, Utc};

/// At or above this many runtime requirements the metric bottoms out
const MAX_ACCEPTABLE_DEPENDENCIES: usize = 20;

/// Fewer direct runtime dependencies means less transitive exposure.
///
/// Platform requirements (`php`, `ext-*`) are not counted.
pub struct DependencyCountMetric;

impl Metric for DependencyCountMetric {
    fn name(&self) -> &'static str {
        "dependency_count"
    }

    fn description(&self) -> &'static str {
        "Direct dependency count (fewer is better)"
    }

    fn default_weight(&self) -> f64 {
        3.0
    }

    fn emoji(&self) -> &'static str {
        "🔗"
    }

    fn is_applicable(&self, package: &PackageInfo) -> bool {
        package.has_registry_data()
    }

    fn higher_is_better(&self) -> bool {
        false
    }

    fn measure(&self, package: &PackageInfo, _now: DateTime<Utc>) -> CptsResult<Measurement> {
        let direct = package.direct_dependency_count();
        let normalized = 1.0 - (direct as f64 / MAX_ACCEPTABLE_DEPENDENCIES as f64).min(1.0);

        Ok(Measurement::new(normalized)
            .with("direct_dependencies", direct)
            .with("max_acceptable", MAX_ACCEPTABLE_DEPENDENCIES))
    }
}
