//! Commit recency and cadence

use super::{round_to, Measurement, Metric};
use crate::error::CptsResult;
use crate::package::PackageInfo;
use chrono::{DateTime, Utc};

const RECENCY_DECAY_DAYS: f64 = 180.0;
const CADENCE_FULL_COMMITS: f64 = 20.0;
const RECENCY_WEIGHT: f64 = 0.6;
const CADENCE_WEIGHT: f64 = 0.4;

/// `0.6 * e^(-d/180) + 0.4 * min(c/20, 1)` where `d` is days since the last
/// commit and `c` the commits of the last 90 days.
pub struct ActivityMetric;

impl Metric for ActivityMetric {
    fn name(&self) -> &'static str {
        "activity"
    }

    fn description(&self) -> &'static str {
        "Project liveliness based on commit recency and frequency"
    }

    fn default_weight(&self) -> f64 {
        4.0
    }

    fn emoji(&self) -> &'static str {
        "🗓️"
    }

    fn is_applicable(&self, package: &PackageInfo) -> bool {
        package.has_repository_data()
    }

    fn measure(&self, package: &PackageInfo, now: DateTime<Utc>) -> CptsResult<Measurement> {
        let days = package.days_since_last_commit(now);
        let commits = package.commits_last_90_days(now);

        let recency = (-(days as f64) / RECENCY_DECAY_DAYS).exp();
        let cadence = (commits as f64 / CADENCE_FULL_COMMITS).min(1.0);

        Ok(
            Measurement::new(RECENCY_WEIGHT * recency + CADENCE_WEIGHT * cadence)
                .with("days_since_last_commit", days)
                .with("commits_last_90d", commits)
                .with("recency_component", round_to(recency, 3))
                .with("cadence_component", round_to(cadence, 3)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::fixtures::{commit, now, repository};

    #[test]
    fn test_fresh_busy_project_is_perfect() {
        let commits = (0..20).map(|i| commit(0, &format!("dev{i}"))).collect();
        let info = PackageInfo::builder("acme/widgets")
            .repository(Some(repository()))
            .commits(commits)
            .build();

        let m = ActivityMetric.measure(&info, now()).unwrap();
        assert!((m.normalized - 1.0).abs() < 1e-12);
        assert_eq!(m.raw["days_since_last_commit"], 0);
        assert_eq!(m.raw["commits_last_90d"], 20);
    }

    #[test]
    fn test_half_year_silence() {
        let info = PackageInfo::builder("acme/widgets")
            .repository(Some(repository()))
            .commits(vec![commit(180, "alice")])
            .build();

        let m = ActivityMetric.measure(&info, now()).unwrap();
        // 0.6 * e^-1
        assert!((m.normalized - 0.2207).abs() < 1e-4);
        assert_eq!(m.raw["recency_component"], 0.368);
        assert_eq!(m.raw["cadence_component"], 0.0);
    }

    #[test]
    fn test_requires_repository() {
        let info = PackageInfo::builder("acme/widgets").build();
        assert!(!ActivityMetric.is_applicable(&info));
    }
}
