//! Builds a [`PackageInfo`] from the registry and the source host
//!
//! Only a malformed name or an exhausted source-host quota stops
//! resolution. Every other failure leaves the affected part absent and is
//! recorded in the snapshot's [`FetchReport`](super::FetchReport).

use super::info::{DataSource, FetchOutcome, FetchStatus, PackageInfo, PackageInfoBuilder};
use super::listing::{detect_ai_artifacts, hygiene_from_listing, README_CANDIDATES};
use crate::api::github::{Commit, FileContent, Issue, PullRequest};
use crate::api::{ApiError, ApiResult, IssueState, PackageRegistry, SourceHost};
use crate::error::{CptsError, CptsResult};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

const COMMIT_WINDOW_DAYS: i64 = 180;
const ISSUE_WINDOW_DAYS: i64 = 365;
const GITHUB_DIR: &str = ".github";

/// Outcome of one sub-fetch; `Err` only for conditions that abort resolution
type Branch<T> = CptsResult<FetchOutcome<T>>;

/// Rate limits abort, everything else is captured as a failed outcome
fn capture<T>(result: ApiResult<T>) -> Branch<T> {
    match result {
        Ok(v) => Ok(FetchOutcome::Found(v)),
        Err(e) if e.is_rate_limit() => Err(e.into()),
        Err(e) => Ok(FetchOutcome::Failed(e.to_string())),
    }
}

/// Split `vendor/package` on the first `/`
pub fn split_package_name(name: &str) -> CptsResult<(&str, &str)> {
    match name.split_once('/') {
        Some((vendor, package)) if !vendor.is_empty() && !package.is_empty() => {
            Ok((vendor, package))
        }
        _ => Err(CptsError::PackageNotFound {
            package: name.to_string(),
            reason: "Invalid package name format".to_string(),
        }),
    }
}

struct RepositoryData {
    commits: Branch<Vec<Commit>>,
    issues: Branch<Vec<Issue>>,
    pull_requests: Branch<Vec<PullRequest>>,
    first_commit: Branch<Option<DateTime<Utc>>>,
    root_listing: Branch<Vec<FileContent>>,
    github_listing: Branch<Vec<FileContent>>,
    readme: Branch<String>,
}

impl Default for RepositoryData {
    fn default() -> Self {
        Self {
            commits: Ok(FetchOutcome::Absent),
            issues: Ok(FetchOutcome::Absent),
            pull_requests: Ok(FetchOutcome::Absent),
            first_commit: Ok(FetchOutcome::Absent),
            root_listing: Ok(FetchOutcome::Absent),
            github_listing: Ok(FetchOutcome::Absent),
            readme: Ok(FetchOutcome::Absent),
        }
    }
}

pub struct PackageResolver {
    source_host: Arc<dyn SourceHost>,
    registry: Arc<dyn PackageRegistry>,
    pool: Option<Arc<rayon::ThreadPool>>,
    reputation: HashMap<String, i64>,
}

impl PackageResolver {
    pub fn new(source_host: Arc<dyn SourceHost>, registry: Arc<dyn PackageRegistry>) -> Self {
        Self {
            source_host,
            registry,
            pool: None,
            reputation: HashMap::new(),
        }
    }

    /// Run the source-host fan-out on a dedicated pool instead of the global one
    pub fn with_thread_pool(mut self, pool: Arc<rayon::ThreadPool>) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Externally computed maintainer reputation, keyed by package name
    pub fn with_reputation_scores(mut self, scores: HashMap<String, i64>) -> Self {
        self.reputation = scores;
        self
    }

    pub fn source_host(&self) -> &dyn SourceHost {
        self.source_host.as_ref()
    }

    pub fn resolve(&self, name: &str) -> CptsResult<PackageInfo> {
        self.resolve_at(name, Utc::now())
    }

    /// Resolve with the lookup windows anchored at `now`
    pub fn resolve_at(&self, name: &str, now: DateTime<Utc>) -> CptsResult<PackageInfo> {
        let (vendor, package_name) = split_package_name(name)?;
        debug!("Resolving {}", name);

        let mut builder = PackageInfo::builder(name).maintainer_reputation_score(
            self.reputation.get(name).copied().unwrap_or(0),
        );

        // Registry: both parts or neither
        let (package, stats) = match capture(self.registry.package(vendor, package_name))? {
            FetchOutcome::Found(package) => {
                match capture(self.registry.stats(vendor, package_name))? {
                    FetchOutcome::Found(stats) => {
                        builder = builder
                            .record(DataSource::RegistryPackage, FetchStatus::Found)
                            .record(DataSource::RegistryStats, FetchStatus::Found);
                        (Some(package), Some(stats))
                    }
                    other => {
                        let status = other.status();
                        warn!("Registry stats for {} unavailable: {}", name, status);
                        builder = builder
                            .record(
                                DataSource::RegistryPackage,
                                FetchStatus::Failed("discarded: stats lookup failed".to_string()),
                            )
                            .record(DataSource::RegistryStats, status);
                        (None, None)
                    }
                }
            }
            other => {
                let status = other.status();
                debug!("Registry package {} unavailable: {}", name, status);
                builder = builder
                    .record(DataSource::RegistryPackage, status)
                    .record(DataSource::RegistryStats, FetchStatus::Skipped);
                (None, None)
            }
        };

        let github = package.as_ref().and_then(|p| p.github_owner_and_repo());
        builder = builder.registry_package(package).registry_stats(stats);

        let Some((owner, repo)) = github else {
            debug!("No GitHub repository declared for {}", name);
            return Ok(builder.record(DataSource::Repository, FetchStatus::Skipped).build());
        };

        let repository = match capture(self.source_host.repository(&owner, &repo))? {
            FetchOutcome::Found(r) => r,
            other => {
                let status = other.status();
                warn!("Repository {}/{} unavailable: {}", owner, repo, status);
                return Ok(builder.record(DataSource::Repository, status).build());
            }
        };
        builder = builder
            .record(DataSource::Repository, FetchStatus::Found)
            .repository(Some(repository));

        let data = match &self.pool {
            Some(pool) => pool.install(|| self.fetch_repository_data(&owner, &repo, now)),
            None => self.fetch_repository_data(&owner, &repo, now),
        };
        Ok(apply_repository_data(builder, data, name)?.build())
    }

    /// Independent source-host lookups, run concurrently
    fn fetch_repository_data(&self, owner: &str, repo: &str, now: DateTime<Utc>) -> RepositoryData {
        let host = self.source_host.as_ref();
        let mut data = RepositoryData::default();
        let RepositoryData {
            commits,
            issues,
            pull_requests,
            first_commit,
            root_listing,
            github_listing,
            readme,
        } = &mut data;

        rayon::scope(|s| {
            s.spawn(move |_| {
                let since = now - Duration::days(COMMIT_WINDOW_DAYS);
                *commits = capture(host.commits(owner, repo, Some(since)));
            });
            s.spawn(move |_| {
                let since = now - Duration::days(ISSUE_WINDOW_DAYS);
                *issues = capture(host.issues(owner, repo, IssueState::All, Some(since)));
            });
            s.spawn(move |_| {
                *pull_requests = capture(host.pull_requests(owner, repo, IssueState::All));
            });
            s.spawn(move |_| {
                *first_commit = capture(host.first_commit_date(owner, repo));
            });
            s.spawn(move |_| {
                *root_listing = capture(host.contents(owner, repo, None));
            });
            s.spawn(move |_| {
                *github_listing = capture(host.contents(owner, repo, Some(GITHUB_DIR)));
            });
            s.spawn(move |_| {
                *readme = fetch_readme(host, owner, repo);
            });
        });

        data
    }
}

/// First README candidate that exists; errors move on to the next name
fn fetch_readme(host: &dyn SourceHost, owner: &str, repo: &str) -> Branch<String> {
    let mut last_error: Option<ApiError> = None;
    for candidate in README_CANDIDATES {
        match host.file_content(owner, repo, candidate) {
            Ok(Some(file)) => {
                return Ok(match file.decoded_content() {
                    Some(text) => FetchOutcome::Found(text),
                    None => FetchOutcome::Absent,
                });
            }
            Ok(None) => {}
            Err(e) if e.is_rate_limit() => return Err(e.into()),
            Err(e) => {
                debug!("README candidate {} failed: {}", candidate, e);
                last_error = Some(e);
            }
        }
    }
    Ok(match last_error {
        Some(e) => FetchOutcome::Failed(e.to_string()),
        None => FetchOutcome::Absent,
    })
}

fn apply_repository_data(
    mut builder: PackageInfoBuilder,
    data: RepositoryData,
    name: &str,
) -> CptsResult<PackageInfoBuilder> {
    let commits = data.commits?;
    let issues = data.issues?;
    let pull_requests = data.pull_requests?;
    let first_commit = data.first_commit?.flatten();
    let root_listing = data.root_listing?;
    let github_listing = data.github_listing?;
    let readme = data.readme?;

    let statuses = [
        (DataSource::Commits, commits.status()),
        (DataSource::Issues, issues.status()),
        (DataSource::PullRequests, pull_requests.status()),
        (DataSource::FirstCommit, first_commit.status()),
        (DataSource::RootListing, root_listing.status()),
        (DataSource::GithubListing, github_listing.status()),
        (DataSource::Readme, readme.status()),
    ];
    for (source, status) in statuses {
        if let FetchStatus::Failed(reason) = &status {
            warn!("{} for {} unavailable: {}", source, name, reason);
        }
        builder = builder.record(source, status);
    }

    builder = builder
        .commits(commits.into_option().unwrap_or_default())
        .issues(issues.into_option().unwrap_or_default())
        .pull_requests(pull_requests.into_option().unwrap_or_default())
        .first_commit_date(first_commit.into_option())
        .readme_content(readme.into_option());

    // Artifacts and hygiene both need the root listing
    if let Some(root) = root_listing.into_option() {
        let github = github_listing.into_option().unwrap_or_default();
        builder = builder
            .detected_ai_artifacts(detect_ai_artifacts(&root, &github))
            .hygiene(hygiene_from_listing(&root));
    }

    Ok(builder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_package_name() {
        assert_eq!(split_package_name("acme/widgets").unwrap(), ("acme", "widgets"));
        assert_eq!(
            split_package_name("acme/widgets/extra").unwrap(),
            ("acme", "widgets/extra")
        );
        for bad in ["widgets", "", "/widgets", "acme/"] {
            let err = split_package_name(bad).unwrap_err();
            assert!(matches!(err, CptsError::PackageNotFound { .. }), "{bad}");
        }
    }

    #[test]
    fn test_capture_separates_rate_limit() {
        let ok: Branch<u8> = capture(Ok(1));
        assert_eq!(ok.unwrap(), FetchOutcome::Found(1));

        let failed: Branch<u8> = capture(Err(ApiError::Network("reset".into())));
        assert!(matches!(failed.unwrap(), FetchOutcome::Failed(r) if r.contains("reset")));

        let limited: Branch<u8> = capture(Err(ApiError::RateLimit {
            remaining: 0,
            resets_at: Utc::now(),
        }));
        assert!(limited.unwrap_err().is_rate_limit());
    }
}
