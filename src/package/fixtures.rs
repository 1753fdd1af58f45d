//! Snapshot fixtures shared by unit tests

use crate::api::github::{Commit, Issue, PullRequest, Repository};
use crate::api::packagist::{Package, Stats, Version};
use chrono::{DateTime, Duration, TimeZone, Utc};
use indexmap::IndexMap;

pub(crate) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

pub(crate) fn repository() -> Repository {
    Repository {
        owner: "acme".into(),
        name: "widgets".into(),
        full_name: "acme/widgets".into(),
        description: None,
        stars: 0,
        forks: 0,
        open_issues: 0,
        has_issues: true,
        archived: false,
        disabled: false,
        created_at: now() - Duration::days(365),
        updated_at: now(),
        pushed_at: None,
        default_branch: Some("main".into()),
        is_organization: false,
        is_verified_organization: false,
    }
}

pub(crate) fn commit(days_ago: i64, author: &str) -> Commit {
    Commit {
        sha: format!("{author}-{days_ago}"),
        message: "Tighten parser error recovery".into(),
        author_name: author.into(),
        author_email: Some(format!("{author}@example.com")),
        author_login: Some(author.into()),
        authored_at: now() - Duration::days(days_ago),
        is_signed: false,
    }
}

pub(crate) fn commit_with_message(days_ago: i64, message: &str) -> Commit {
    Commit {
        message: message.into(),
        ..commit(days_ago, "dev")
    }
}

pub(crate) fn issue(created_days_ago: i64, closed_days_ago: Option<i64>, comments: u64) -> Issue {
    Issue {
        number: 1,
        title: "Crash on empty input".into(),
        state: if closed_days_ago.is_some() { "closed" } else { "open" }.into(),
        created_at: now() - Duration::days(created_days_ago),
        closed_at: closed_days_ago.map(|d| now() - Duration::days(d)),
        author_login: Some("reporter".into()),
        comments,
        is_pull_request: false,
    }
}

pub(crate) fn pull_request(comments: u64, review_comments: u64) -> PullRequest {
    PullRequest {
        number: 2,
        title: "Fix crash".into(),
        state: "closed".into(),
        created_at: now() - Duration::days(10),
        merged_at: Some(now() - Duration::days(9)),
        closed_at: Some(now() - Duration::days(9)),
        author_login: Some("contributor".into()),
        comments,
        review_comments,
        additions: 10,
        deletions: 2,
        changed_files: 1,
    }
}

pub(crate) fn registry_package(requires: &[&str]) -> Package {
    let require: IndexMap<String, String> = requires
        .iter()
        .map(|name| (name.to_string(), "^1.0".to_string()))
        .collect();
    Package {
        name: "acme/widgets".into(),
        description: None,
        repository: Some("https://github.com/acme/widgets".into()),
        downloads: 0,
        favers: 0,
        versions: vec![Version {
            version: "1.0.0".into(),
            version_normalized: "1.0.0.0".into(),
            license: None,
            require,
            require_dev: IndexMap::new(),
            time: None,
            keywords: Vec::new(),
            source: None,
        }],
        maintainers: Vec::new(),
        kind: Some("library".into()),
        abandoned: false,
        replacement_package: None,
    }
}

pub(crate) fn stats(dependents: u64) -> Stats {
    Stats {
        dependents,
        ..Stats::default()
    }
}
