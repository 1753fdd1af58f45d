use super::{Measurement, Metric};
use crate::error::CptsResult;
use crate::package::PackageInfo;
use chrono::{DateTime, Utc};

/// Committers needed for a full score
const FULL_SCORE_COMMITTERS: usize = 5;

/// Bus factor: distinct commit authors over the last 180 days
pub struct CommittersMetric;

impl Metric for CommittersMetric {
    fn name(&self) -> &'static str {
        "committers"
    }

    fn description(&self) -> &'static str {
        "Active committer count (bus factor)"
    }

    fn default_weight(&self) -> f64 {
        5.0
    }

    fn emoji(&self) -> &'static str {
        "👥"
    }

    fn is_applicable(&self, package: &PackageInfo) -> bool {
        package.has_repository_data()
    }

    fn measure(&self, package: &PackageInfo, now: DateTime<Utc>) -> CptsResult<Measurement> {
        let unique = package.unique_committers_last_180_days(now);
        let normalized = (unique as f64 / FULL_SCORE_COMMITTERS as f64).min(1.0);

        Ok(Measurement::new(normalized)
            .with("unique_committers_180d", unique)
            .with("max_for_full_score", FULL_SCORE_COMMITTERS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::fixtures::{commit, now, repository};

    fn measure(commits: Vec<crate::api::github::Commit>) -> Measurement {
        let info = PackageInfo::builder("acme/widgets")
            .repository(Some(repository()))
            .commits(commits)
            .build();
        CommittersMetric.measure(&info, now()).unwrap()
    }

    #[test]
    fn test_counts_distinct_authors_in_window() {
        let m = measure(vec![
            commit(1, "alice"),
            commit(2, "alice"),
            commit(3, "bob"),
            commit(200, "carol"),
        ]);
        assert!((m.normalized - 0.4).abs() < 1e-12);
        assert_eq!(m.raw["unique_committers_180d"], 2);
    }

    #[test]
    fn test_caps_at_five() {
        let commits = ["a", "b", "c", "d", "e", "f", "g"]
            .iter()
            .map(|a| commit(5, a))
            .collect();
        assert_eq!(measure(commits).normalized, 1.0);
        assert_eq!(measure(Vec::new()).normalized, 0.0);
    }
}
