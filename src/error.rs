//! Error taxonomy for the scoring core
//!
//! Only two conditions ever stop a package from getting a score:
//! a malformed name and an exhausted source-host quota. Everything else
//! degrades into absent data or a failed metric entry.

use crate::api::ApiError;
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum CptsError {
    #[error("Package not found: {package} ({reason})")]
    PackageNotFound { package: String, reason: String },

    #[error("API rate limit exceeded ({remaining} remaining, resets at {resets_at})")]
    RateLimited {
        remaining: u32,
        resets_at: DateTime<Utc>,
    },

    #[error("Failed to calculate {metric} for {package}: {message}")]
    ScoreCalculation {
        package: String,
        metric: String,
        message: String,
    },

    #[error(transparent)]
    Api(ApiError),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl CptsError {
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, CptsError::RateLimited { .. })
    }

    /// Seconds until the quota resets, or `None` for any other error.
    pub fn seconds_until_reset(&self, now: DateTime<Utc>) -> Option<i64> {
        match self {
            CptsError::RateLimited { resets_at, .. } => {
                Some((*resets_at - now).num_seconds().max(0))
            }
            _ => None,
        }
    }
}

impl From<ApiError> for CptsError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::RateLimit {
                remaining,
                resets_at,
            } => CptsError::RateLimited {
                remaining,
                resets_at,
            },
            other => CptsError::Api(other),
        }
    }
}

pub type CptsResult<T> = Result<T, CptsError>;
