//! Packagist client
//!
//! Package metadata and stats both come from the same document; they are
//! cached under separate keys because stats go stale much faster.

mod dto;

pub use dto::{parse_github_url, Package, Stats, Version};

use super::{make_agent, transport_error, ApiError, ApiResult, PackageRegistry, USER_AGENT};
use crate::cache::{get_typed, set_typed, Cache};
use dto::{parse_document, PackageWire};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const BASE_URL: &str = "https://packagist.org";

const TTL_PACKAGE: Duration = Duration::from_secs(43_200);
const TTL_STATS: Duration = Duration::from_secs(3_600);

pub struct PackagistClient {
    agent: ureq::Agent,
    cache: Arc<dyn Cache>,
    ttl_override: Option<Duration>,
}

impl PackagistClient {
    pub fn new(cache: Arc<dyn Cache>) -> Self {
        Self {
            agent: make_agent(),
            cache,
            ttl_override: None,
        }
    }

    /// Use one TTL for every endpoint instead of the per-endpoint defaults
    pub fn with_ttl_override(mut self, ttl: Option<Duration>) -> Self {
        self.ttl_override = ttl;
        self
    }

    fn document(&self, vendor: &str, name: &str) -> ApiResult<PackageWire> {
        let endpoint = format!("/packages/{vendor}/{name}.json");
        let url = format!("{BASE_URL}{endpoint}");
        debug!("GET {}", url);

        let response = self
            .agent
            .get(&url)
            .header("Accept", "application/json")
            .header("User-Agent", USER_AGENT)
            .call()
            .map_err(transport_error)?;

        let status = response.status().as_u16();
        if status == 404 {
            return Err(ApiError::NotFound { resource: endpoint });
        }
        if status >= 400 {
            let message = response.into_body().read_to_string().unwrap_or_default();
            return Err(ApiError::Http { status, message });
        }

        let body = response
            .into_body()
            .read_to_string()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        parse_document(&body).map_err(|e| ApiError::Parse(e.to_string()))
    }
}

impl PackageRegistry for PackagistClient {
    fn package(&self, vendor: &str, name: &str) -> ApiResult<Package> {
        let key = format!("packagist.{vendor}.{name}.meta");
        if let Some(hit) = get_typed(self.cache.as_ref(), &key) {
            return Ok(hit);
        }
        let package = Package::from(self.document(vendor, name)?);
        set_typed(
            self.cache.as_ref(),
            &key,
            &package,
            self.ttl_override.unwrap_or(TTL_PACKAGE),
        );
        Ok(package)
    }

    fn stats(&self, vendor: &str, name: &str) -> ApiResult<Stats> {
        let key = format!("packagist.{vendor}.{name}.stats");
        if let Some(hit) = get_typed(self.cache.as_ref(), &key) {
            return Ok(hit);
        }
        let stats = self.document(vendor, name)?.stats();
        set_typed(
            self.cache.as_ref(),
            &key,
            &stats,
            self.ttl_override.unwrap_or(TTL_STATS),
        );
        Ok(stats)
    }
}
