//! Shared remaining-quota counter for the source host

use chrono::{DateTime, TimeZone, Utc};
use std::sync::atomic::{AtomicU32, Ordering};

/// GitHub's documented quota for authenticated requests
pub const DEFAULT_QUOTA: u32 = 5000;

/// Remaining-quota counter updated from response headers.
///
/// Parallel resolver branches share one client, so the counter is atomic:
/// the last response to land wins, which matches what the host reports.
#[derive(Debug)]
pub struct RateLimitTracker {
    remaining: AtomicU32,
}

impl Default for RateLimitTracker {
    fn default() -> Self {
        Self::new(DEFAULT_QUOTA)
    }
}

impl RateLimitTracker {
    pub fn new(initial: u32) -> Self {
        Self {
            remaining: AtomicU32::new(initial),
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining.load(Ordering::Relaxed)
    }

    pub fn record(&self, remaining: u32) {
        self.remaining.store(remaining, Ordering::Relaxed);
    }

    /// Update from a raw `X-RateLimit-Remaining` header value. Unparseable values are ignored.
    pub fn record_header(&self, value: Option<&str>) {
        if let Some(n) = value.and_then(|v| v.trim().parse::<u32>().ok()) {
            self.record(n);
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }
}

/// Parse an `X-RateLimit-Reset` epoch-seconds header, falling back to `now`.
pub fn parse_reset_header(value: Option<&str>, now: DateTime<Utc>) -> DateTime<Utc> {
    value
        .and_then(|v| v.trim().parse::<i64>().ok())
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
        .unwrap_or(now)
}
