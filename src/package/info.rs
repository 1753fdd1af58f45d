//! Per-package data snapshot
//!
//! A `PackageInfo` is assembled once by the resolver through
//! [`PackageInfoBuilder`] and is read-only afterwards. Every collection may
//! be empty and every optional part may be absent; the derived accessors
//! fall back to fixed defaults instead of failing.

use crate::api::github::{Commit, Issue, PullRequest, Repository};
use crate::api::packagist::{Package, Stats};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;
use std::fmt;

/// Days since last commit when neither commits nor a push date are known
pub const UNKNOWN_LAST_COMMIT_DAYS: i64 = 365;
/// Median response when no issue contributes a sample
pub const DEFAULT_RESPONSE_DAYS: f64 = 7.0;
/// Stand-in response time for open issues that have comments
const COMMENTED_RESPONSE_DAYS: f64 = 3.0;
const MAX_RESPONSE_DAYS: f64 = 30.0;

/// One remote lookup performed while resolving a package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataSource {
    RegistryPackage,
    RegistryStats,
    Repository,
    Commits,
    Issues,
    PullRequests,
    FirstCommit,
    RootListing,
    GithubListing,
    Readme,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::RegistryPackage => "registry_package",
            DataSource::RegistryStats => "registry_stats",
            DataSource::Repository => "repository",
            DataSource::Commits => "commits",
            DataSource::Issues => "issues",
            DataSource::PullRequests => "pull_requests",
            DataSource::FirstCommit => "first_commit",
            DataSource::RootListing => "root_listing",
            DataSource::GithubListing => "github_listing",
            DataSource::Readme => "readme",
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one best-effort lookup
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome<T> {
    Found(T),
    /// The remote answered but had nothing (no README, no first-commit page)
    Absent,
    Failed(String),
}

impl<T> FetchOutcome<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            FetchOutcome::Found(v) => Some(v),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FetchOutcome<U> {
        match self {
            FetchOutcome::Found(v) => FetchOutcome::Found(f(v)),
            FetchOutcome::Absent => FetchOutcome::Absent,
            FetchOutcome::Failed(r) => FetchOutcome::Failed(r),
        }
    }

    pub fn status(&self) -> FetchStatus {
        match self {
            FetchOutcome::Found(_) => FetchStatus::Found,
            FetchOutcome::Absent => FetchStatus::Absent,
            FetchOutcome::Failed(r) => FetchStatus::Failed(r.clone()),
        }
    }
}

impl<T> FetchOutcome<Option<T>> {
    /// `Found(None)` becomes `Absent`
    pub fn flatten(self) -> FetchOutcome<T> {
        match self {
            FetchOutcome::Found(Some(v)) => FetchOutcome::Found(v),
            FetchOutcome::Found(None) | FetchOutcome::Absent => FetchOutcome::Absent,
            FetchOutcome::Failed(r) => FetchOutcome::Failed(r),
        }
    }
}

/// Data-free view of a [`FetchOutcome`], kept for diagnostics
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStatus {
    Found,
    Absent,
    Failed(String),
    /// Never attempted because an earlier lookup came back empty
    Skipped,
}

impl fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchStatus::Found => f.write_str("found"),
            FetchStatus::Absent => f.write_str("absent"),
            FetchStatus::Failed(reason) => write!(f, "failed: {reason}"),
            FetchStatus::Skipped => f.write_str("skipped"),
        }
    }
}

/// What happened to each lookup, in the order they were recorded
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchReport {
    entries: Vec<(DataSource, FetchStatus)>,
}

impl FetchReport {
    pub fn record(&mut self, source: DataSource, status: FetchStatus) {
        match self.entries.iter_mut().find(|(s, _)| *s == source) {
            Some(entry) => entry.1 = status,
            None => self.entries.push((source, status)),
        }
    }

    pub fn status(&self, source: DataSource) -> Option<&FetchStatus> {
        self.entries
            .iter()
            .find(|(s, _)| *s == source)
            .map(|(_, status)| status)
    }

    pub fn entries(&self) -> &[(DataSource, FetchStatus)] {
        &self.entries
    }

    pub fn failures(&self) -> impl Iterator<Item = (DataSource, &str)> {
        self.entries.iter().filter_map(|(s, status)| match status {
            FetchStatus::Failed(reason) => Some((*s, reason.as_str())),
            _ => None,
        })
    }
}

/// Coarse code-hygiene counters; all best-effort
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HygieneCounts {
    pub test_files: u64,
    pub source_files: u64,
    pub todo_count: u64,
    pub lines_of_code: u64,
    pub stub_count: u64,
}

#[derive(Debug, Clone)]
pub struct PackageInfo {
    name: String,
    repository: Option<Repository>,
    registry_package: Option<Package>,
    registry_stats: Option<Stats>,
    commits: Vec<Commit>,
    issues: Vec<Issue>,
    pull_requests: Vec<PullRequest>,
    first_commit_date: Option<DateTime<Utc>>,
    detected_ai_artifacts: Vec<String>,
    readme_content: Option<String>,
    hygiene: HygieneCounts,
    maintainer_reputation_score: i64,
    fetch_report: FetchReport,
}

impl PackageInfo {
    pub fn builder(name: impl Into<String>) -> PackageInfoBuilder {
        PackageInfoBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_repository_data(&self) -> bool {
        self.repository.is_some()
    }

    pub fn has_registry_data(&self) -> bool {
        self.registry_package.is_some()
    }

    pub fn fetch_report(&self) -> &FetchReport {
        &self.fetch_report
    }

    // ========== Repository data ==========

    pub fn repository(&self) -> Option<&Repository> {
        self.repository.as_ref()
    }

    pub fn stars(&self) -> u64 {
        self.repository.as_ref().map_or(0, |r| r.stars)
    }

    pub fn open_issue_count(&self) -> u64 {
        self.repository.as_ref().map_or(0, |r| r.open_issues)
    }

    pub fn is_verified_organization(&self) -> bool {
        self.repository
            .as_ref()
            .is_some_and(|r| r.is_verified_organization)
    }

    /// Repository age from its creation date
    pub fn age_in_years(&self, now: DateTime<Utc>) -> f64 {
        self.repository.as_ref().map_or(0.0, |r| r.age_in_years(now))
    }

    /// First commit date, else the repository creation date
    pub fn first_commit_date(&self) -> Option<DateTime<Utc>> {
        self.first_commit_date
            .or_else(|| self.repository.as_ref().map(|r| r.created_at))
    }

    // ========== Commit data ==========

    /// Most recent first
    pub fn recent_commits(&self) -> &[Commit] {
        &self.commits
    }

    /// Whole days since the newest commit, else since the last push, else 365
    pub fn days_since_last_commit(&self, now: DateTime<Utc>) -> i64 {
        let last = self
            .commits
            .first()
            .map(|c| c.authored_at)
            .or_else(|| self.repository.as_ref().and_then(|r| r.pushed_at));
        match last {
            Some(at) => (now - at).num_days().abs(),
            None => UNKNOWN_LAST_COMMIT_DAYS,
        }
    }

    pub fn commits_last_90_days(&self, now: DateTime<Utc>) -> usize {
        let cutoff = now - Duration::days(90);
        self.commits.iter().filter(|c| c.authored_at >= cutoff).count()
    }

    pub fn unique_committers_last_180_days(&self, now: DateTime<Utc>) -> usize {
        let cutoff = now - Duration::days(180);
        self.commits
            .iter()
            .filter(|c| c.authored_at >= cutoff)
            .map(Commit::author_identity)
            .collect::<HashSet<_>>()
            .len()
    }

    // ========== Issue data ==========

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn pull_requests(&self) -> &[PullRequest] {
        &self.pull_requests
    }

    pub fn issues_opened_last_365_days(&self, now: DateTime<Utc>) -> usize {
        let cutoff = now - Duration::days(365);
        self.issues
            .iter()
            .filter(|i| !i.is_pull_request && i.created_at >= cutoff)
            .count()
    }

    pub fn issues_closed_last_365_days(&self, now: DateTime<Utc>) -> usize {
        let cutoff = now - Duration::days(365);
        self.issues
            .iter()
            .filter(|i| !i.is_pull_request && i.is_closed())
            .filter(|i| i.closed_at.is_some_and(|at| at >= cutoff))
            .count()
    }

    /// Median days to first response, proxied by time-to-close
    ///
    /// Closed issues contribute `min(days to close, 30)`; open issues with
    /// comments contribute 3; anything else is left out. No samples gives 7.
    pub fn median_first_response_days(&self) -> f64 {
        let mut samples: Vec<f64> = self
            .issues
            .iter()
            .filter(|i| !i.is_pull_request)
            .filter_map(|i| match i.time_to_close_days() {
                Some(days) => Some(days.min(MAX_RESPONSE_DAYS)),
                None if i.comments > 0 => Some(COMMENTED_RESPONSE_DAYS),
                None => None,
            })
            .collect();

        if samples.is_empty() {
            return DEFAULT_RESPONSE_DAYS;
        }
        samples.sort_by(|a, b| a.total_cmp(b));
        let mid = samples.len() / 2;
        if samples.len() % 2 == 0 {
            (samples[mid - 1] + samples[mid]) / 2.0
        } else {
            samples[mid]
        }
    }

    pub fn average_review_comments_per_pr(&self) -> f64 {
        if self.pull_requests.is_empty() {
            return 0.0;
        }
        let total: u64 = self
            .pull_requests
            .iter()
            .map(PullRequest::total_review_comments)
            .sum();
        total as f64 / self.pull_requests.len() as f64
    }

    // ========== Registry data ==========

    pub fn registry_package(&self) -> Option<&Package> {
        self.registry_package.as_ref()
    }

    pub fn registry_stats(&self) -> Option<&Stats> {
        self.registry_stats.as_ref()
    }

    pub fn dependents_count(&self) -> u64 {
        self.registry_stats.as_ref().map_or(0, |s| s.dependents)
    }

    pub fn direct_dependency_count(&self) -> usize {
        self.registry_package
            .as_ref()
            .map_or(0, Package::direct_dependency_count)
    }

    pub fn is_abandoned(&self) -> bool {
        self.registry_package.as_ref().is_some_and(|p| p.abandoned)
    }

    // ========== AI heuristics data ==========

    pub fn detected_ai_artifacts(&self) -> &[String] {
        &self.detected_ai_artifacts
    }

    pub fn readme_content(&self) -> Option<&str> {
        self.readme_content.as_deref()
    }

    // ========== Hygiene / trust data ==========

    pub fn hygiene(&self) -> &HygieneCounts {
        &self.hygiene
    }

    pub fn maintainer_reputation_score(&self) -> i64 {
        self.maintainer_reputation_score
    }
}

/// Staging area for one resolution run
#[derive(Debug, Clone)]
pub struct PackageInfoBuilder {
    info: PackageInfo,
}

impl PackageInfoBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            info: PackageInfo {
                name: name.into(),
                repository: None,
                registry_package: None,
                registry_stats: None,
                commits: Vec::new(),
                issues: Vec::new(),
                pull_requests: Vec::new(),
                first_commit_date: None,
                detected_ai_artifacts: Vec::new(),
                readme_content: None,
                hygiene: HygieneCounts::default(),
                maintainer_reputation_score: 0,
                fetch_report: FetchReport::default(),
            },
        }
    }

    pub fn repository(mut self, repository: Option<Repository>) -> Self {
        self.info.repository = repository;
        self
    }

    pub fn registry_package(mut self, package: Option<Package>) -> Self {
        self.info.registry_package = package;
        self
    }

    pub fn registry_stats(mut self, stats: Option<Stats>) -> Self {
        self.info.registry_stats = stats;
        self
    }

    pub fn commits(mut self, commits: Vec<Commit>) -> Self {
        self.info.commits = commits;
        self
    }

    pub fn issues(mut self, issues: Vec<Issue>) -> Self {
        self.info.issues = issues;
        self
    }

    pub fn pull_requests(mut self, pull_requests: Vec<PullRequest>) -> Self {
        self.info.pull_requests = pull_requests;
        self
    }

    pub fn first_commit_date(mut self, date: Option<DateTime<Utc>>) -> Self {
        self.info.first_commit_date = date;
        self
    }

    pub fn detected_ai_artifacts(mut self, artifacts: Vec<String>) -> Self {
        self.info.detected_ai_artifacts = artifacts;
        self
    }

    pub fn readme_content(mut self, content: Option<String>) -> Self {
        self.info.readme_content = content;
        self
    }

    pub fn hygiene(mut self, hygiene: HygieneCounts) -> Self {
        self.info.hygiene = hygiene;
        self
    }

    pub fn maintainer_reputation_score(mut self, score: i64) -> Self {
        self.info.maintainer_reputation_score = score;
        self
    }

    pub fn record(mut self, source: DataSource, status: FetchStatus) -> Self {
        self.info.fetch_report.record(source, status);
        self
    }

    pub fn build(self) -> PackageInfo {
        self.info
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn commit(days_ago: i64, login: Option<&str>, email: Option<&str>, name: &str) -> Commit {
        Commit {
            sha: format!("{days_ago}"),
            message: "Refactor".into(),
            author_name: name.into(),
            author_email: email.map(String::from),
            author_login: login.map(String::from),
            authored_at: now() - Duration::days(days_ago),
            is_signed: false,
        }
    }

    fn issue(created_days_ago: i64, closed_after_days: Option<f64>, comments: u64) -> Issue {
        let created = now() - Duration::days(created_days_ago);
        Issue {
            number: 1,
            title: "bug".into(),
            state: if closed_after_days.is_some() { "closed" } else { "open" }.into(),
            created_at: created,
            closed_at: closed_after_days.map(|d| created + Duration::minutes((d * 1440.0) as i64)),
            author_login: None,
            comments,
            is_pull_request: false,
        }
    }

    fn repository(pushed_days_ago: Option<i64>) -> Repository {
        Repository {
            owner: "acme".into(),
            name: "widgets".into(),
            full_name: "acme/widgets".into(),
            description: None,
            stars: 10,
            forks: 0,
            open_issues: 3,
            has_issues: true,
            archived: false,
            disabled: false,
            created_at: now() - Duration::days(730),
            updated_at: now(),
            pushed_at: pushed_days_ago.map(|d| now() - Duration::days(d)),
            default_branch: Some("main".into()),
            is_organization: true,
            is_verified_organization: false,
        }
    }

    #[test]
    fn test_empty_snapshot_defaults() {
        let info = PackageInfo::builder("acme/widgets").build();
        assert!(!info.has_repository_data());
        assert!(!info.has_registry_data());
        assert_eq!(info.days_since_last_commit(now()), 365);
        assert_eq!(info.commits_last_90_days(now()), 0);
        assert_eq!(info.unique_committers_last_180_days(now()), 0);
        assert_eq!(info.median_first_response_days(), 7.0);
        assert_eq!(info.average_review_comments_per_pr(), 0.0);
        assert_eq!(info.dependents_count(), 0);
        assert_eq!(info.direct_dependency_count(), 0);
        assert_eq!(info.stars(), 0);
        assert!(info.first_commit_date().is_none());
        assert!(info.readme_content().is_none());
    }

    #[test]
    fn test_days_since_last_commit_prefers_commits_then_push() {
        let info = PackageInfo::builder("a/b")
            .repository(Some(repository(Some(40))))
            .commits(vec![commit(12, None, None, "x"), commit(50, None, None, "y")])
            .build();
        assert_eq!(info.days_since_last_commit(now()), 12);

        let info = PackageInfo::builder("a/b")
            .repository(Some(repository(Some(40))))
            .build();
        assert_eq!(info.days_since_last_commit(now()), 40);

        let info = PackageInfo::builder("a/b")
            .repository(Some(repository(None)))
            .build();
        assert_eq!(info.days_since_last_commit(now()), 365);
    }

    #[test]
    fn test_commit_windows() {
        let info = PackageInfo::builder("a/b")
            .commits(vec![
                commit(1, Some("ada"), None, "Ada"),
                commit(30, Some("ada"), Some("ada@x"), "Ada L"),
                commit(89, None, Some("bob@x"), "Bob"),
                commit(120, None, None, "Carol"),
                commit(200, Some("dave"), None, "Dave"),
            ])
            .build();
        assert_eq!(info.commits_last_90_days(now()), 3);
        assert_eq!(info.unique_committers_last_180_days(now()), 3);
    }

    #[test]
    fn test_issue_windows() {
        let mut old_closed = issue(400, Some(1.0), 0);
        old_closed.closed_at = Some(now() - Duration::days(380));
        let mut pr = issue(5, None, 0);
        pr.is_pull_request = true;
        let info = PackageInfo::builder("a/b")
            .issues(vec![issue(10, Some(2.0), 1), issue(20, None, 0), old_closed, pr])
            .build();
        assert_eq!(info.issues_opened_last_365_days(now()), 2);
        assert_eq!(info.issues_closed_last_365_days(now()), 1);
    }

    #[test]
    fn test_median_first_response() {
        // Samples: 2.0, 30 (capped), 3 (open with comments); open without comments excluded
        let info = PackageInfo::builder("a/b")
            .issues(vec![
                issue(10, Some(2.0), 0),
                issue(100, Some(45.0), 0),
                issue(5, None, 4),
                issue(5, None, 0),
            ])
            .build();
        assert_eq!(info.median_first_response_days(), 3.0);

        let info = PackageInfo::builder("a/b")
            .issues(vec![issue(10, Some(1.0), 0), issue(10, Some(4.0), 0)])
            .build();
        assert!((info.median_first_response_days() - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_first_commit_date_falls_back_to_creation() {
        let repo = repository(None);
        let created = repo.created_at;
        let info = PackageInfo::builder("a/b").repository(Some(repo.clone())).build();
        assert_eq!(info.first_commit_date(), Some(created));

        let earlier = created - Duration::days(100);
        let info = PackageInfo::builder("a/b")
            .repository(Some(repo))
            .first_commit_date(Some(earlier))
            .build();
        assert_eq!(info.first_commit_date(), Some(earlier));
    }

    #[test]
    fn test_fetch_report_records_last_status() {
        let info = PackageInfo::builder("a/b")
            .record(DataSource::Commits, FetchStatus::Failed("timeout".into()))
            .record(DataSource::Readme, FetchStatus::Absent)
            .record(DataSource::Commits, FetchStatus::Found)
            .build();
        assert_eq!(info.fetch_report().status(DataSource::Commits), Some(&FetchStatus::Found));
        assert_eq!(info.fetch_report().entries().len(), 2);
        assert_eq!(info.fetch_report().failures().count(), 0);
    }

    #[test]
    fn test_fetch_outcome_flatten() {
        let found: FetchOutcome<Option<u8>> = FetchOutcome::Found(Some(1));
        assert_eq!(found.flatten(), FetchOutcome::Found(1));
        let empty: FetchOutcome<Option<u8>> = FetchOutcome::Found(None);
        assert_eq!(empty.flatten(), FetchOutcome::Absent);
        let failed: FetchOutcome<Option<u8>> = FetchOutcome::Failed("x".into());
        assert_eq!(failed.flatten().status(), FetchStatus::Failed("x".into()));
    }
}
