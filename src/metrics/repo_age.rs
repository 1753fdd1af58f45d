use super::{round_to, Measurement, Metric};
use crate::error::CptsResult;
use crate::package::PackageInfo;
use chrono::{DateTime, Utc};
use serde_json::Value;

const FULL_SCORE_YEARS: f64 = 5.0;
const DAYS_PER_YEAR: f64 = 365.25;

/// Maturity: years since the first commit, saturating at five
pub struct RepoAgeMetric;

impl RepoAgeMetric {
    /// Whole days since the first commit (or repository creation) in years
    fn age_years(package: &PackageInfo, now: DateTime<Utc>) -> f64 {
        package
            .first_commit_date()
            .map_or(0.0, |first| (now - first).num_days().max(0) as f64 / DAYS_PER_YEAR)
    }
}

impl Metric for RepoAgeMetric {
    fn name(&self) -> &'static str {
        "repo_age"
    }

    fn description(&self) -> &'static str {
        "Repository age (maturity signal)"
    }

    fn default_weight(&self) -> f64 {
        2.0
    }

    fn emoji(&self) -> &'static str {
        "🕰️"
    }

    fn is_applicable(&self, package: &PackageInfo) -> bool {
        package.has_repository_data()
    }

    fn measure(&self, package: &PackageInfo, now: DateTime<Utc>) -> CptsResult<Measurement> {
        let years = Self::age_years(package, now);
        let first_commit = package
            .first_commit_date()
            .map_or(Value::Null, |d| Value::from(d.format("%Y-%m-%d").to_string()));

        Ok(Measurement::new((years / FULL_SCORE_YEARS).min(1.0))
            .with("age_years", round_to(years, 2))
            .with("first_commit_date", first_commit))
    }
}
