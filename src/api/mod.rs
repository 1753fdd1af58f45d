//! Remote data sources
//!
//! The scoring core only talks to two narrow collaborator traits:
//!
//! - [`SourceHost`] - repository, commit, issue, PR and file data for `(owner, name)`
//! - [`PackageRegistry`] - package metadata and stats for `(vendor, name)`
//!
//! Concrete clients ([`github::GitHubClient`], [`packagist::PackagistClient`])
//! use ureq (sync HTTP) and sit behind the shared [`crate::cache::Cache`].

pub mod github;
pub mod packagist;
mod rate_limit;

pub use rate_limit::RateLimitTracker;

use chrono::{DateTime, Utc};
use std::time::Duration;
use thiserror::Error;

use github::{Commit, FileContent, Issue, PullRequest, Repository};
use packagist::{Package, Stats};

/// Shared user agent for both remotes
pub const USER_AGENT: &str = "CPTS/1.0";

/// Errors raised by the remote collaborators
#[derive(Error, Debug, Clone)]
pub enum ApiError {
    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("API rate limit exceeded ({remaining} remaining)")]
    RateLimit {
        remaining: u32,
        resets_at: DateTime<Utc>,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error: {status} - {message}")]
    Http { status: u16, message: String },

    #[error("Failed to parse API response: {0}")]
    Parse(String),
}

impl ApiError {
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, ApiError::RateLimit { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Issue/PR state filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IssueState {
    Open,
    Closed,
    #[default]
    All,
}

impl IssueState {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueState::Open => "open",
            IssueState::Closed => "closed",
            IssueState::All => "all",
        }
    }
}

/// Source-hosting service (GitHub)
pub trait SourceHost: Send + Sync {
    fn repository(&self, owner: &str, name: &str) -> ApiResult<Repository>;

    /// Commits, most recent first
    fn commits(
        &self,
        owner: &str,
        name: &str,
        since: Option<DateTime<Utc>>,
    ) -> ApiResult<Vec<Commit>>;

    /// Issues, never including pull requests
    fn issues(
        &self,
        owner: &str,
        name: &str,
        state: IssueState,
        since: Option<DateTime<Utc>>,
    ) -> ApiResult<Vec<Issue>>;

    fn pull_requests(&self, owner: &str, name: &str, state: IssueState)
        -> ApiResult<Vec<PullRequest>>;

    fn first_commit_date(&self, owner: &str, name: &str) -> ApiResult<Option<DateTime<Utc>>>;

    /// Directory listing; `None` lists the repository root
    fn contents(&self, owner: &str, name: &str, path: Option<&str>)
        -> ApiResult<Vec<FileContent>>;

    fn file_content(&self, owner: &str, name: &str, path: &str) -> ApiResult<Option<FileContent>>;

    fn remaining_rate_limit(&self) -> u32;

    fn is_authenticated(&self) -> bool;
}

/// Package registry (Packagist)
pub trait PackageRegistry: Send + Sync {
    fn package(&self, vendor: &str, name: &str) -> ApiResult<Package>;

    fn stats(&self, vendor: &str, name: &str) -> ApiResult<Stats>;

    fn dependents_count(&self, vendor: &str, name: &str) -> ApiResult<u64> {
        Ok(self.stats(vendor, name)?.dependents)
    }

    fn package_exists(&self, vendor: &str, name: &str) -> ApiResult<bool> {
        match self.package(vendor, name) {
            Ok(_) => Ok(true),
            Err(ApiError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Build the ureq agent shared by both clients
pub(crate) fn make_agent() -> ureq::Agent {
    ureq::config::Config::builder()
        .http_status_as_error(false) // Status codes are mapped to ApiError by the clients
        .timeout_global(Some(Duration::from_secs(30)))
        .build()
        .new_agent()
}

/// Map a transport failure to the API taxonomy
pub(crate) fn transport_error(err: ureq::Error) -> ApiError {
    match err {
        ureq::Error::StatusCode(status) => ApiError::Http {
            status,
            message: "unexpected status".to_string(),
        },
        other => ApiError::Network(other.to_string()),
    }
}
