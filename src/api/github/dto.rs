//! GitHub REST payloads
//!
//! `*Wire` structs mirror the JSON GitHub serves and tolerate missing
//! fields; the public structs are what the rest of the crate (and the
//! response cache) sees.

use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Commit messages that carry no information on their own
pub const GENERIC_MESSAGES: &[&str] = &[
    "update",
    "fix",
    "add",
    "remove",
    "change",
    "modify",
    "edit",
    "initial commit",
    "wip",
    "work in progress",
    "minor",
    "misc",
    "stuff",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub owner: String,
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub stars: u64,
    pub forks: u64,
    pub open_issues: u64,
    pub has_issues: bool,
    pub archived: bool,
    pub disabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub pushed_at: Option<DateTime<Utc>>,
    pub default_branch: Option<String>,
    pub is_organization: bool,
    pub is_verified_organization: bool,
}

impl Repository {
    /// Whole days since creation over 365.25
    pub fn age_in_years(&self, now: DateTime<Utc>) -> f64 {
        (now - self.created_at).num_days().abs() as f64 / 365.25
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    pub sha: String,
    pub message: String,
    pub author_name: String,
    pub author_email: Option<String>,
    pub author_login: Option<String>,
    pub authored_at: DateTime<Utc>,
    pub is_signed: bool,
}

impl Commit {
    /// Message length in bytes
    pub fn message_len(&self) -> usize {
        self.message.len()
    }

    pub fn is_generic_message(&self) -> bool {
        let normalized = self.message.trim().to_lowercase();
        GENERIC_MESSAGES.iter().any(|pattern| {
            normalized == *pattern
                || normalized
                    .strip_prefix(pattern)
                    .is_some_and(|rest| rest.starts_with(' '))
        })
    }

    /// Identity used for committer counting: login, else email, else name
    pub fn author_identity(&self) -> &str {
        self.author_login
            .as_deref()
            .or(self.author_email.as_deref())
            .unwrap_or(&self.author_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    pub state: String,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub author_login: Option<String>,
    pub comments: u64,
    pub is_pull_request: bool,
}

impl Issue {
    pub fn is_open(&self) -> bool {
        self.state == "open"
    }

    pub fn is_closed(&self) -> bool {
        self.state == "closed"
    }

    /// Fractional days between creation and close, at minute resolution
    pub fn time_to_close_days(&self) -> Option<f64> {
        let closed = self.closed_at?;
        Some((closed - self.created_at).num_minutes().abs() as f64 / 1440.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub state: String,
    pub created_at: DateTime<Utc>,
    pub merged_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub author_login: Option<String>,
    pub comments: u64,
    pub review_comments: u64,
    pub additions: u64,
    pub deletions: u64,
    pub changed_files: u64,
}

impl PullRequest {
    pub fn is_merged(&self) -> bool {
        self.merged_at.is_some()
    }

    pub fn total_review_comments(&self) -> u64 {
        self.comments + self.review_comments
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileContent {
    pub path: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub size: u64,
    pub content: Option<String>,
    pub encoding: Option<String>,
}

impl FileContent {
    pub fn is_directory(&self) -> bool {
        self.kind == "dir"
    }

    /// Body text; GitHub wraps base64 payloads at 60 columns.
    pub fn decoded_content(&self) -> Option<String> {
        let content = self.content.as_deref()?;
        if self.encoding.as_deref() != Some("base64") {
            return Some(content.to_string());
        }
        let compact: String = content.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        let bytes = general_purpose::STANDARD.decode(compact).ok()?;
        Some(String::from_utf8_lossy(&bytes).into_owned())
    }
}

// ---------------------------------------------------------------------------
// Wire formats
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct OwnerWire {
    login: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    is_verified: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RepositoryWire {
    owner: OwnerWire,
    name: Option<String>,
    full_name: Option<String>,
    description: Option<String>,
    stargazers_count: u64,
    forks_count: u64,
    open_issues_count: u64,
    has_issues: Option<bool>,
    archived: bool,
    disabled: bool,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
    pushed_at: Option<DateTime<Utc>>,
    default_branch: Option<String>,
}

impl From<RepositoryWire> for Repository {
    fn from(w: RepositoryWire) -> Self {
        Self {
            is_organization: w.owner.kind.as_deref() == Some("Organization"),
            is_verified_organization: w.owner.is_verified.unwrap_or(false),
            owner: w.owner.login.unwrap_or_default(),
            name: w.name.unwrap_or_default(),
            full_name: w.full_name.unwrap_or_default(),
            description: w.description,
            stars: w.stargazers_count,
            forks: w.forks_count,
            open_issues: w.open_issues_count,
            has_issues: w.has_issues.unwrap_or(true),
            archived: w.archived,
            disabled: w.disabled,
            created_at: w.created_at.unwrap_or_else(Utc::now),
            updated_at: w.updated_at.unwrap_or_else(Utc::now),
            pushed_at: w.pushed_at,
            default_branch: Some(w.default_branch.unwrap_or_else(|| "main".to_string())),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct UserRefWire {
    login: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GitPersonWire {
    name: Option<String>,
    email: Option<String>,
    date: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct VerificationWire {
    verified: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CommitDetailWire {
    message: String,
    author: Option<GitPersonWire>,
    verification: Option<VerificationWire>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct CommitWire {
    sha: String,
    commit: CommitDetailWire,
    author: Option<UserRefWire>,
}

impl From<CommitWire> for Commit {
    fn from(w: CommitWire) -> Self {
        let person = w.commit.author.unwrap_or_default();
        Self {
            sha: w.sha,
            message: w.commit.message,
            author_name: person.name.unwrap_or_else(|| "Unknown".to_string()),
            author_email: person.email,
            author_login: w.author.and_then(|a| a.login),
            authored_at: person.date.unwrap_or_else(Utc::now),
            is_signed: w.commit.verification.is_some_and(|v| v.verified),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct IssueWire {
    number: u64,
    title: String,
    state: Option<String>,
    created_at: Option<DateTime<Utc>>,
    closed_at: Option<DateTime<Utc>>,
    user: Option<UserRefWire>,
    comments: u64,
    pull_request: Option<serde_json::Value>,
}

impl IssueWire {
    pub(crate) fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }
}

impl From<IssueWire> for Issue {
    fn from(w: IssueWire) -> Self {
        Self {
            is_pull_request: w.is_pull_request(),
            number: w.number,
            title: w.title,
            state: w.state.unwrap_or_else(|| "open".to_string()),
            created_at: w.created_at.unwrap_or_else(Utc::now),
            closed_at: w.closed_at,
            author_login: w.user.and_then(|u| u.login),
            comments: w.comments,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct PullRequestWire {
    number: u64,
    title: String,
    state: Option<String>,
    created_at: Option<DateTime<Utc>>,
    merged_at: Option<DateTime<Utc>>,
    closed_at: Option<DateTime<Utc>>,
    user: Option<UserRefWire>,
    comments: u64,
    review_comments: u64,
    additions: u64,
    deletions: u64,
    changed_files: u64,
}

impl From<PullRequestWire> for PullRequest {
    fn from(w: PullRequestWire) -> Self {
        Self {
            number: w.number,
            title: w.title,
            state: w.state.unwrap_or_else(|| "open".to_string()),
            created_at: w.created_at.unwrap_or_else(Utc::now),
            merged_at: w.merged_at,
            closed_at: w.closed_at,
            author_login: w.user.and_then(|u| u.login),
            comments: w.comments,
            review_comments: w.review_comments,
            additions: w.additions,
            deletions: w.deletions,
            changed_files: w.changed_files,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct FileContentWire {
    path: String,
    name: String,
    #[serde(rename = "type")]
    kind: Option<String>,
    size: u64,
    content: Option<String>,
    encoding: Option<String>,
}

impl From<FileContentWire> for FileContent {
    fn from(w: FileContentWire) -> Self {
        Self {
            path: w.path,
            name: w.name,
            kind: w.kind.unwrap_or_else(|| "file".to_string()),
            size: w.size,
            content: w.content,
            encoding: w.encoding,
        }
    }
}
