//! GitHub REST client
//!
//! Uses ureq (sync HTTP). Every response goes through the shared
//! [`RateLimitTracker`] and decoded payloads are cached per endpoint.

mod dto;

pub use dto::{Commit, FileContent, Issue, PullRequest, Repository, GENERIC_MESSAGES};

use super::rate_limit::parse_reset_header;
use super::{
    make_agent, transport_error, ApiError, ApiResult, IssueState, RateLimitTracker, SourceHost,
    USER_AGENT,
};
use crate::cache::{get_typed, set_typed, Cache};
use chrono::{DateTime, Utc};
use dto::{CommitWire, FileContentWire, IssueWire, PullRequestWire, RepositoryWire};
use regex::Regex;
use serde::de::DeserializeOwned;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::debug;

const BASE_URL: &str = "https://api.github.com";

const TTL_REPO: Duration = Duration::from_secs(86_400);
const TTL_COMMITS: Duration = Duration::from_secs(14_400);
const TTL_ISSUES: Duration = Duration::from_secs(14_400);
const TTL_CONTENTS: Duration = Duration::from_secs(86_400);

const PER_PAGE: &str = "100";

static LAST_PAGE: OnceLock<Regex> = OnceLock::new();

fn last_page_re() -> &'static Regex {
    LAST_PAGE.get_or_init(|| Regex::new(r#"page=(\d+)>; rel="last""#).unwrap())
}

/// Page number of the `rel="last"` entry of a `Link` header
pub fn last_page_from_link(link: &str) -> Option<u32> {
    last_page_re()
        .captures(link)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

type Response = ureq::http::Response<ureq::Body>;

pub struct GitHubClient {
    agent: ureq::Agent,
    cache: Arc<dyn Cache>,
    token: Option<String>,
    rate_limit: RateLimitTracker,
    ttl_override: Option<Duration>,
}

impl GitHubClient {
    pub fn new(cache: Arc<dyn Cache>, token: Option<String>) -> Self {
        Self {
            agent: make_agent(),
            cache,
            token: token.filter(|t| !t.trim().is_empty()),
            rate_limit: RateLimitTracker::default(),
            ttl_override: None,
        }
    }

    /// Use one TTL for every endpoint instead of the per-endpoint defaults
    pub fn with_ttl_override(mut self, ttl: Option<Duration>) -> Self {
        self.ttl_override = ttl;
        self
    }

    fn ttl(&self, default: Duration) -> Duration {
        self.ttl_override.unwrap_or(default)
    }

    fn send(&self, endpoint: &str, query: &[(&str, String)]) -> ApiResult<Response> {
        let url = format!("{}{}", BASE_URL, endpoint);
        debug!("GET {}", url);

        let mut req = self
            .agent
            .get(&url)
            .header("Accept", "application/vnd.github.v3+json")
            .header("User-Agent", USER_AGENT);
        if let Some(token) = &self.token {
            req = req.header("Authorization", &format!("Bearer {}", token));
        }
        for (key, value) in query {
            req = req.query(*key, value);
        }

        let response = req.call().map_err(transport_error)?;
        self.rate_limit.record_header(header(&response, "X-RateLimit-Remaining"));

        let status = response.status().as_u16();
        match status {
            200..=399 => Ok(response),
            401 => Err(ApiError::Authentication("Invalid GitHub token".to_string())),
            403 if self.rate_limit.is_exhausted() => Err(self.rate_limit_error(&response)),
            429 => Err(self.rate_limit_error(&response)),
            404 => Err(ApiError::NotFound {
                resource: endpoint.to_string(),
            }),
            _ => {
                let message = response.into_body().read_to_string().unwrap_or_default();
                Err(ApiError::Http { status, message })
            }
        }
    }

    fn rate_limit_error(&self, response: &Response) -> ApiError {
        self.rate_limit.record(0);
        ApiError::RateLimit {
            remaining: 0,
            resets_at: parse_reset_header(header(response, "X-RateLimit-Reset"), Utc::now()),
        }
    }

    fn get_json<T: DeserializeOwned>(&self, endpoint: &str, query: &[(&str, String)]) -> ApiResult<T> {
        self.send(endpoint, query)?
            .into_body()
            .read_json()
            .map_err(|e| ApiError::Parse(e.to_string()))
    }

    fn cached<T, F>(&self, key: &str, ttl: Duration, fetch: F) -> ApiResult<T>
    where
        T: serde::Serialize + DeserializeOwned,
        F: FnOnce() -> ApiResult<T>,
    {
        if let Some(hit) = get_typed(self.cache.as_ref(), key) {
            debug!("Cache hit: {}", key);
            return Ok(hit);
        }
        let value = fetch()?;
        set_typed(self.cache.as_ref(), key, &value, self.ttl(ttl));
        Ok(value)
    }

    fn oldest_commit_date(&self, owner: &str, name: &str) -> ApiResult<Option<DateTime<Utc>>> {
        let endpoint = format!("/repos/{owner}/{name}/commits");
        let response = self.send(&endpoint, &oldest_commit_query(None))?;
        let Some(last) = header(&response, "Link").and_then(last_page_from_link) else {
            return Ok(None);
        };

        let page: Vec<CommitWire> = self.get_json(&endpoint, &oldest_commit_query(Some(last)))?;
        Ok(page.into_iter().last().map(|w| Commit::from(w).authored_at))
    }
}

/// One commit per page on the default branch, so the `rel="last"` page holds
/// the oldest one
fn oldest_commit_query(page: Option<u32>) -> Vec<(&'static str, String)> {
    let mut query = vec![("per_page", "1".to_string())];
    if let Some(page) = page {
        query.push(("page", page.to_string()));
    }
    query
}

fn header<'a>(response: &'a Response, name: &str) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}

fn day_key(since: Option<DateTime<Utc>>) -> String {
    since
        .map(|s| s.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "all".to_string())
}

impl SourceHost for GitHubClient {
    fn repository(&self, owner: &str, name: &str) -> ApiResult<Repository> {
        let key = format!("github.{owner}.{name}.repository");
        self.cached(&key, TTL_REPO, || {
            let wire: RepositoryWire = self.get_json(&format!("/repos/{owner}/{name}"), &[])?;
            Ok(Repository::from(wire))
        })
    }

    fn commits(&self, owner: &str, name: &str, since: Option<DateTime<Utc>>) -> ApiResult<Vec<Commit>> {
        let key = format!("github.{owner}.{name}.commits.{}", day_key(since));
        self.cached(&key, TTL_COMMITS, || {
            let mut query = vec![("per_page", PER_PAGE.to_string())];
            if let Some(since) = since {
                query.push(("since", since.to_rfc3339()));
            }
            let wire: Vec<CommitWire> = self.get_json(&format!("/repos/{owner}/{name}/commits"), &query)?;
            Ok(wire.into_iter().map(Commit::from).collect())
        })
    }

    fn issues(
        &self,
        owner: &str,
        name: &str,
        state: IssueState,
        since: Option<DateTime<Utc>>,
    ) -> ApiResult<Vec<Issue>> {
        let key = format!("github.{owner}.{name}.issues.{}.{}", state.as_str(), day_key(since));
        self.cached(&key, TTL_ISSUES, || {
            let mut query = vec![
                ("state", state.as_str().to_string()),
                ("per_page", PER_PAGE.to_string()),
                ("sort", "created".to_string()),
                ("direction", "desc".to_string()),
            ];
            if let Some(since) = since {
                query.push(("since", since.to_rfc3339()));
            }
            let wire: Vec<IssueWire> = self.get_json(&format!("/repos/{owner}/{name}/issues"), &query)?;
            Ok(wire
                .into_iter()
                .filter(|w| !w.is_pull_request())
                .map(Issue::from)
                .collect())
        })
    }

    fn pull_requests(&self, owner: &str, name: &str, state: IssueState) -> ApiResult<Vec<PullRequest>> {
        let key = format!("github.{owner}.{name}.pulls.{}", state.as_str());
        self.cached(&key, TTL_ISSUES, || {
            let query = [
                ("state", state.as_str().to_string()),
                ("per_page", PER_PAGE.to_string()),
                ("sort", "created".to_string()),
                ("direction", "desc".to_string()),
            ];
            let wire: Vec<PullRequestWire> = self.get_json(&format!("/repos/{owner}/{name}/pulls"), &query)?;
            Ok(wire.into_iter().map(PullRequest::from).collect())
        })
    }

    fn first_commit_date(&self, owner: &str, name: &str) -> ApiResult<Option<DateTime<Utc>>> {
        let key = format!("github.{owner}.{name}.first_commit");
        if let Some(hit) = get_typed::<DateTime<Utc>>(self.cache.as_ref(), &key) {
            return Ok(Some(hit));
        }

        // None leaves the repository creation date to the snapshot
        let date = match self.oldest_commit_date(owner, name) {
            Ok(Some(date)) => date,
            Ok(None) => return Ok(None),
            Err(e) if e.is_rate_limit() => return Err(e),
            Err(e) => {
                debug!("First commit lookup failed for {}/{}: {}", owner, name, e);
                return Ok(None);
            }
        };
        set_typed(self.cache.as_ref(), &key, &date, self.ttl(TTL_REPO));
        Ok(Some(date))
    }

    fn contents(&self, owner: &str, name: &str, path: Option<&str>) -> ApiResult<Vec<FileContent>> {
        let path = path.unwrap_or("").trim_start_matches('/');
        let key = format!("github.{owner}.{name}.contents.{}", crate::cache::paths::hash_key(path));

        let result = self.cached(&key, TTL_CONTENTS, || {
            let mut endpoint = format!("/repos/{owner}/{name}/contents");
            if !path.is_empty() {
                endpoint.push('/');
                endpoint.push_str(path);
            }
            // A file path yields one object, a directory an array
            let value: serde_json::Value = self.get_json(&endpoint, &[])?;
            let entries: Vec<FileContentWire> = if value.is_array() {
                serde_json::from_value(value)
            } else {
                serde_json::from_value(value).map(|one| vec![one])
            }
            .map_err(|e| ApiError::Parse(e.to_string()))?;
            Ok(entries.into_iter().map(FileContent::from).collect())
        });

        match result {
            Err(ApiError::NotFound { .. }) => Ok(Vec::new()),
            other => other,
        }
    }

    fn file_content(&self, owner: &str, name: &str, path: &str) -> ApiResult<Option<FileContent>> {
        Ok(self
            .contents(owner, name, Some(path))?
            .into_iter()
            .find(|c| !c.is_directory() && c.path == path))
    }

    fn remaining_rate_limit(&self) -> u32 {
        self.rate_limit.remaining()
    }

    fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}
