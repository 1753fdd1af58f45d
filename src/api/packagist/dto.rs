//! Packagist payloads (`/packages/<vendor>/<name>.json`)

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;

static GITHUB_URL: OnceLock<Regex> = OnceLock::new();

fn github_url_re() -> &'static Regex {
    GITHUB_URL.get_or_init(|| Regex::new(r"github\.com[/:]([^/]+)/([^/#?\s]+)").unwrap())
}

/// Owner and repository name from any github.com URL form
/// (`https://github.com/o/r`, `git@github.com:o/r.git`, `…/o/r/`).
pub fn parse_github_url(url: &str) -> Option<(String, String)> {
    let caps = github_url_re().captures(url)?;
    let owner = caps.get(1)?.as_str();
    let repo = caps.get(2)?.as_str();
    let repo = repo.strip_suffix(".git").unwrap_or(repo);
    if owner.is_empty() || repo.is_empty() {
        return None;
    }
    Some((owner.to_string(), repo.to_string()))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Version {
    pub version: String,
    pub version_normalized: String,
    pub license: Option<String>,
    pub require: IndexMap<String, String>,
    pub require_dev: IndexMap<String, String>,
    pub time: Option<DateTime<Utc>>,
    pub keywords: Vec<String>,
    pub source: Option<String>,
}

impl Version {
    pub fn is_dev(&self) -> bool {
        self.version.starts_with("dev-")
    }

    pub fn is_stable(&self) -> bool {
        !self.is_dev()
            && !["alpha", "beta", "rc"]
                .iter()
                .any(|tag| self.version.contains(tag))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    pub description: Option<String>,
    pub repository: Option<String>,
    pub downloads: u64,
    pub favers: u64,
    /// In the order Packagist serves them
    pub versions: Vec<Version>,
    pub maintainers: Vec<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub abandoned: bool,
    pub replacement_package: Option<String>,
}

impl Package {
    /// First non-`dev-` version, else whatever comes first
    pub fn latest_version(&self) -> Option<&Version> {
        self.versions
            .iter()
            .find(|v| !v.is_dev())
            .or_else(|| self.versions.first())
    }

    /// Runtime requirements of the latest version, platform packages excluded
    pub fn direct_dependency_count(&self) -> usize {
        self.latest_version()
            .map(|v| {
                v.require
                    .keys()
                    .filter(|dep| !dep.starts_with("php") && !dep.starts_with("ext-"))
                    .count()
            })
            .unwrap_or(0)
    }

    pub fn github_owner_and_repo(&self) -> Option<(String, String)> {
        self.repository.as_deref().and_then(parse_github_url)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Stats {
    pub total_downloads: u64,
    pub monthly_downloads: u64,
    pub daily_downloads: u64,
    pub dependents: u64,
    pub suggesters: u64,
}

// ---------------------------------------------------------------------------
// Wire formats
// ---------------------------------------------------------------------------

/// The `{"package": {...}}` document
#[derive(Debug, Deserialize)]
struct PackageDocument {
    package: PackageWire,
}

/// Parse a package document straight from the body text, so `versions`
/// keeps the order Packagist serves it in
pub(crate) fn parse_document(body: &str) -> serde_json::Result<PackageWire> {
    serde_json::from_str::<PackageDocument>(body).map(|doc| doc.package)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DownloadsWire {
    total: u64,
    monthly: u64,
    daily: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct VersionWire {
    version: String,
    version_normalized: Option<String>,
    license: Value,
    require: IndexMap<String, Value>,
    #[serde(rename = "require-dev")]
    require_dev: IndexMap<String, Value>,
    time: Option<DateTime<Utc>>,
    keywords: Vec<String>,
    source: Option<SourceWire>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SourceWire {
    url: Option<String>,
}

fn constraint_map(raw: IndexMap<String, Value>) -> IndexMap<String, String> {
    raw.into_iter()
        .map(|(k, v)| {
            let constraint = match v {
                Value::String(s) => s,
                other => other.to_string(),
            };
            (k, constraint)
        })
        .collect()
}

impl From<VersionWire> for Version {
    fn from(w: VersionWire) -> Self {
        let license = match w.license {
            Value::String(s) => Some(s),
            Value::Array(items) => items.into_iter().find_map(|v| v.as_str().map(String::from)),
            _ => None,
        };
        Self {
            version_normalized: w.version_normalized.unwrap_or_else(|| w.version.clone()),
            version: w.version,
            license,
            require: constraint_map(w.require),
            require_dev: constraint_map(w.require_dev),
            time: w.time,
            keywords: w.keywords,
            source: w.source.and_then(|s| s.url),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct PackageWire {
    name: String,
    description: Option<String>,
    repository: Option<String>,
    downloads: Value,
    favers: u64,
    versions: IndexMap<String, VersionWire>,
    maintainers: Vec<Value>,
    #[serde(rename = "type")]
    kind: Option<String>,
    abandoned: Value,
    dependents: u64,
    suggesters: u64,
}

impl PackageWire {
    fn downloads(&self) -> DownloadsWire {
        match &self.downloads {
            Value::Number(n) => DownloadsWire {
                total: n.as_u64().unwrap_or(0),
                ..Default::default()
            },
            other => serde_json::from_value(other.clone()).unwrap_or_default(),
        }
    }

    pub(crate) fn stats(&self) -> Stats {
        let downloads = self.downloads();
        Stats {
            total_downloads: downloads.total,
            monthly_downloads: downloads.monthly,
            daily_downloads: downloads.daily,
            dependents: self.dependents,
            suggesters: self.suggesters,
        }
    }
}

impl From<PackageWire> for Package {
    fn from(w: PackageWire) -> Self {
        let downloads = w.downloads().total;
        let (abandoned, replacement_package) = match &w.abandoned {
            Value::String(s) => (true, Some(s.clone())),
            Value::Bool(b) => (*b, None),
            Value::Null => (false, None),
            _ => (true, None),
        };
        let maintainers = w
            .maintainers
            .into_iter()
            .filter_map(|m| match m {
                Value::String(s) => Some(s),
                Value::Object(map) => map.get("name").and_then(|n| n.as_str()).map(String::from),
                _ => None,
            })
            .collect();
        Self {
            name: w.name,
            description: w.description,
            repository: w.repository,
            downloads,
            favers: w.favers,
            versions: w.versions.into_values().map(Version::from).collect(),
            maintainers,
            kind: w.kind,
            abandoned,
            replacement_package,
        }
    }
}
