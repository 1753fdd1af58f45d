//! In-memory source host and registry for integration tests

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use cpts::api::github::{Commit, FileContent, Issue, PullRequest, Repository};
use cpts::api::packagist::{Package, Stats, Version};
use cpts::api::{ApiError, ApiResult, IssueState, PackageRegistry, SourceHost};
use indexmap::IndexMap;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

pub fn repository(stars: u64) -> Repository {
    Repository {
        owner: "acme".into(),
        name: "widgets".into(),
        full_name: "acme/widgets".into(),
        description: Some("Widgets for everyone".into()),
        stars,
        forks: 3,
        open_issues: 2,
        has_issues: true,
        archived: false,
        disabled: false,
        created_at: now() - Duration::days(4 * 365),
        updated_at: now(),
        pushed_at: Some(now() - Duration::days(1)),
        default_branch: Some("main".into()),
        is_organization: true,
        is_verified_organization: false,
    }
}

pub fn commit(days_ago: i64, author: &str) -> Commit {
    Commit {
        sha: format!("{author}{days_ago:04}"),
        message: "Handle empty configuration sections".into(),
        author_name: author.into(),
        author_email: Some(format!("{author}@example.com")),
        author_login: Some(author.into()),
        authored_at: now() - Duration::days(days_ago),
        is_signed: false,
    }
}

pub fn entry(path: &str, kind: &str) -> FileContent {
    FileContent {
        path: path.into(),
        name: path.rsplit('/').next().unwrap_or(path).into(),
        kind: kind.into(),
        size: 0,
        content: None,
        encoding: None,
    }
}

pub fn package(repository: Option<&str>) -> Package {
    let require: IndexMap<String, String> = [("php", ">=8.1"), ("psr/log", "^3.0")]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Package {
        name: "acme/widgets".into(),
        description: None,
        repository: repository.map(str::to_string),
        downloads: 1_000,
        favers: 12,
        versions: vec![Version {
            version: "2.1.0".into(),
            version_normalized: "2.1.0.0".into(),
            license: Some("MIT".into()),
            require,
            require_dev: IndexMap::new(),
            time: None,
            keywords: Vec::new(),
            source: None,
        }],
        maintainers: vec!["acme".into()],
        kind: Some("library".into()),
        abandoned: false,
        replacement_package: None,
    }
}

fn rate_limit() -> ApiError {
    ApiError::RateLimit {
        remaining: 0,
        resets_at: now() + Duration::minutes(30),
    }
}

fn network(what: &str) -> ApiError {
    ApiError::Network(format!("{what}: connection reset"))
}

/// Source host serving one repository; individual endpoints can be made
/// to fail or hit the rate limit
pub struct FakeHost {
    pub repository: Option<Repository>,
    pub commits: Vec<Commit>,
    pub issues: Vec<Issue>,
    pub pull_requests: Vec<PullRequest>,
    pub root: Vec<FileContent>,
    pub readme: Option<String>,
    pub failing: HashSet<&'static str>,
    pub rate_limited: HashSet<&'static str>,
    pub authenticated: bool,
    pub remaining: u32,
    pub calls: AtomicUsize,
}

impl Default for FakeHost {
    fn default() -> Self {
        Self {
            repository: Some(repository(250)),
            commits: vec![commit(2, "alice"), commit(20, "bob"), commit(40, "carol")],
            issues: Vec::new(),
            pull_requests: Vec::new(),
            root: vec![entry("src", "dir"), entry("tests", "dir"), entry("README.md", "file")],
            readme: Some("# Widgets\n\nSmall widget library.\n".into()),
            failing: HashSet::new(),
            rate_limited: HashSet::new(),
            authenticated: true,
            remaining: 4_999,
            calls: AtomicUsize::new(0),
        }
    }
}

impl FakeHost {
    pub fn failing(mut self, endpoint: &'static str) -> Self {
        self.failing.insert(endpoint);
        self
    }

    pub fn rate_limited(mut self, endpoint: &'static str) -> Self {
        self.rate_limited.insert(endpoint);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn guard(&self, endpoint: &'static str) -> ApiResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.rate_limited.contains(endpoint) {
            return Err(rate_limit());
        }
        if self.failing.contains(endpoint) {
            return Err(network(endpoint));
        }
        Ok(())
    }
}

impl SourceHost for FakeHost {
    fn repository(&self, owner: &str, name: &str) -> ApiResult<Repository> {
        self.guard("repository")?;
        self.repository.clone().ok_or_else(|| ApiError::NotFound {
            resource: format!("repos/{owner}/{name}"),
        })
    }

    fn commits(
        &self,
        _owner: &str,
        _name: &str,
        since: Option<DateTime<Utc>>,
    ) -> ApiResult<Vec<Commit>> {
        self.guard("commits")?;
        Ok(self
            .commits
            .iter()
            .filter(|c| since.map_or(true, |s| c.authored_at >= s))
            .cloned()
            .collect())
    }

    fn issues(
        &self,
        _owner: &str,
        _name: &str,
        _state: IssueState,
        _since: Option<DateTime<Utc>>,
    ) -> ApiResult<Vec<Issue>> {
        self.guard("issues")?;
        Ok(self.issues.clone())
    }

    fn pull_requests(
        &self,
        _owner: &str,
        _name: &str,
        _state: IssueState,
    ) -> ApiResult<Vec<PullRequest>> {
        self.guard("pull_requests")?;
        Ok(self.pull_requests.clone())
    }

    fn first_commit_date(&self, _owner: &str, _name: &str) -> ApiResult<Option<DateTime<Utc>>> {
        self.guard("first_commit")?;
        Ok(Some(now() - Duration::days(5 * 365)))
    }

    fn contents(
        &self,
        _owner: &str,
        _name: &str,
        path: Option<&str>,
    ) -> ApiResult<Vec<FileContent>> {
        self.guard("contents")?;
        Ok(match path {
            None => self.root.clone(),
            Some(_) => Vec::new(),
        })
    }

    fn file_content(&self, _owner: &str, _name: &str, path: &str) -> ApiResult<Option<FileContent>> {
        self.guard("file_content")?;
        if path != "README.md" {
            return Ok(None);
        }
        Ok(self.readme.as_ref().map(|text| FileContent {
            content: Some(text.clone()),
            ..entry(path, "file")
        }))
    }

    fn remaining_rate_limit(&self) -> u32 {
        self.remaining
    }

    fn is_authenticated(&self) -> bool {
        self.authenticated
    }
}

/// Registry serving one package
pub struct FakeRegistry {
    pub package: Option<Package>,
    pub stats: Option<Stats>,
    pub calls: AtomicUsize,
}

impl FakeRegistry {
    pub fn new(package: Option<Package>, dependents: u64) -> Self {
        Self {
            package,
            stats: Some(Stats {
                total_downloads: 50_000,
                monthly_downloads: 2_000,
                dependents,
                ..Stats::default()
            }),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn without_stats(mut self) -> Self {
        self.stats = None;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PackageRegistry for FakeRegistry {
    fn package(&self, vendor: &str, name: &str) -> ApiResult<Package> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.package.clone().ok_or_else(|| ApiError::NotFound {
            resource: format!("packages/{vendor}/{name}"),
        })
    }

    fn stats(&self, vendor: &str, name: &str) -> ApiResult<Stats> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.stats.ok_or_else(|| ApiError::Http {
            status: 500,
            message: format!("stats for {vendor}/{name}"),
        })
    }
}
