//! Issue and pull request responsiveness
//!
//! ```text
//! close    = min(closed / (opened + 1), 1)
//! response = 1 - min(median_first_response_days / 14, 1)
//! review   = min(review_comments_per_pr / 3, 1)
//! issue_behaviour = 0.4 * close + 0.3 * response + 0.3 * review
//! ```

use super::{round_to, Measurement, Metric};
use crate::error::CptsResult;
use crate::package::PackageInfo;
use chrono::{DateTime, Utc};

const MAX_RESPONSE_DAYS: f64 = 14.0;
const TARGET_REVIEW_COMMENTS: f64 = 3.0;

const CLOSE_WEIGHT: f64 = 0.4;
const RESPONSE_WEIGHT: f64 = 0.3;
const REVIEW_WEIGHT: f64 = 0.3;

pub struct IssueBehaviourMetric;

impl Metric for IssueBehaviourMetric {
    fn name(&self) -> &'static str {
        "issue_behaviour"
    }

    fn description(&self) -> &'static str {
        "Issue/PR responsiveness"
    }

    fn default_weight(&self) -> f64 {
        4.0
    }

    fn emoji(&self) -> &'static str {
        "💬"
    }

    fn is_applicable(&self, package: &PackageInfo) -> bool {
        package.has_repository_data()
    }

    fn measure(&self, package: &PackageInfo, now: DateTime<Utc>) -> CptsResult<Measurement> {
        let opened = package.issues_opened_last_365_days(now);
        let closed = package.issues_closed_last_365_days(now);
        let median_response = package.median_first_response_days();
        let review_comments = package.average_review_comments_per_pr();

        let close_ratio = closed as f64 / (opened as f64 + 1.0);
        let close = close_ratio.min(1.0);
        let response = 1.0 - (median_response / MAX_RESPONSE_DAYS).min(1.0);
        let review = (review_comments / TARGET_REVIEW_COMMENTS).min(1.0);

        let normalized = CLOSE_WEIGHT * close + RESPONSE_WEIGHT * response + REVIEW_WEIGHT * review;

        Ok(Measurement::new(normalized)
            .with("issues_opened_365d", opened)
            .with("issues_closed_365d", closed)
            .with("close_ratio", round_to(close_ratio, 3))
            .with("close_norm", round_to(close, 3))
            .with("median_response_days", round_to(median_response, 1))
            .with("response_norm", round_to(response, 3))
            .with("review_comments_per_pr", round_to(review_comments, 2))
            .with("review_norm", round_to(review, 3)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::fixtures::{issue, now, pull_request, repository};

    #[test]
    fn test_quiet_repository_uses_defaults() {
        let info = PackageInfo::builder("acme/widgets")
            .repository(Some(repository()))
            .build();
        let m = IssueBehaviourMetric.measure(&info, now()).unwrap();
        // no issues: close 0, default 7-day response -> 0.5, no PRs
        assert!((m.normalized - 0.15).abs() < 1e-12);
        assert_eq!(m.raw["median_response_days"], 7.0);
        assert_eq!(m.raw["review_comments_per_pr"], 0.0);
    }

    #[test]
    fn test_responsive_repository() {
        let info = PackageInfo::builder("acme/widgets")
            .repository(Some(repository()))
            .issues(vec![
                issue(10, Some(10), 0),
                issue(20, Some(20), 1),
                issue(30, Some(29), 2),
            ])
            .pull_requests(vec![pull_request(2, 2), pull_request(1, 1)])
            .build();
        let m = IssueBehaviourMetric.measure(&info, now()).unwrap();

        assert_eq!(m.raw["issues_opened_365d"], 3);
        assert_eq!(m.raw["issues_closed_365d"], 3);
        assert_eq!(m.raw["close_ratio"], 0.75);
        // closed same day apart from one that took a day: median 0
        assert_eq!(m.raw["median_response_days"], 0.0);
        assert_eq!(m.raw["review_comments_per_pr"], 3.0);
        assert!((m.normalized - (0.4 * 0.75 + 0.3 + 0.3)).abs() < 1e-12);
    }

    #[test]
    fn test_slow_responses_floor_at_zero() {
        let info = PackageInfo::builder("acme/widgets")
            .repository(Some(repository()))
            .issues(vec![issue(100, Some(40), 0), issue(90, None, 0)])
            .build();
        let m = IssueBehaviourMetric.measure(&info, now()).unwrap();
        // 60 days capped to 30; the open uncommented issue is not a sample
        assert_eq!(m.raw["median_response_days"], 30.0);
        assert_eq!(m.raw["response_norm"], 0.0);
    }
}
