//! Additive trust adjustments outside the weighted metrics

use crate::package::PackageInfo;
use chrono::{DateTime, Utc};
use serde::Serialize;

const MAINTAINER_REPUTATION_BONUS: f64 = 0.5;
const VERIFIED_ORG_BONUS: f64 = 0.3;
const SIGNED_COMMITS_BONUS: f64 = 0.2;
const BUS_FACTOR_PENALTY: f64 = -0.5;
const ABANDONED_PENALTY: f64 = -0.5;

const MIN_REPUTATION_SCORE: i64 = 2;
const SIGNED_COMMIT_SHARE: f64 = 0.5;
const ABANDONED_AFTER_DAYS: i64 = 365;
const ABANDONED_OPEN_ISSUES: u64 = 10;

/// Which adjustments fired for a package
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TrustBreakdown {
    pub maintainer_reputation: bool,
    pub verified_org: bool,
    pub signed_commits: bool,
    pub bus_factor_one: bool,
    pub abandoned: bool,
}

impl TrustBreakdown {
    /// Sum of the fired adjustments, not clamped
    pub fn total(&self) -> f64 {
        [
            (self.maintainer_reputation, MAINTAINER_REPUTATION_BONUS),
            (self.verified_org, VERIFIED_ORG_BONUS),
            (self.signed_commits, SIGNED_COMMITS_BONUS),
            (self.bus_factor_one, BUS_FACTOR_PENALTY),
            (self.abandoned, ABANDONED_PENALTY),
        ]
        .iter()
        .filter(|(fired, _)| *fired)
        .map(|(_, amount)| amount)
        .sum()
    }
}

/// Trust bonus heuristics
///
/// | check                                         | amount |
/// |-----------------------------------------------|--------|
/// | maintainer reputation score >= 2              | +0.5   |
/// | repository owned by a verified organization   | +0.3   |
/// | >= 50% of recent commits signed               | +0.2   |
/// | <= 1 committer in the last 180 days           | -0.5   |
/// | > 365 days since last commit and > 10 issues  | -0.5   |
#[derive(Debug, Clone, Copy, Default)]
pub struct TrustBonus;

impl TrustBonus {
    /// Unclamped bonus; the calculator clamps it to `[-1, 1]`
    pub fn calculate(&self, package: &PackageInfo, now: DateTime<Utc>) -> f64 {
        self.breakdown(package, now).total()
    }

    pub fn breakdown(&self, package: &PackageInfo, now: DateTime<Utc>) -> TrustBreakdown {
        TrustBreakdown {
            maintainer_reputation: package.maintainer_reputation_score() >= MIN_REPUTATION_SCORE,
            verified_org: package.is_verified_organization(),
            signed_commits: has_signed_commits(package),
            bus_factor_one: package.unique_committers_last_180_days(now) <= 1,
            abandoned: package.days_since_last_commit(now) > ABANDONED_AFTER_DAYS
                && package.open_issue_count() > ABANDONED_OPEN_ISSUES,
        }
    }
}

fn has_signed_commits(package: &PackageInfo) -> bool {
    let commits = package.recent_commits();
    if commits.is_empty() {
        return false;
    }
    let signed = commits.iter().filter(|c| c.is_signed).count();
    signed as f64 / commits.len() as f64 >= SIGNED_COMMIT_SHARE
}
