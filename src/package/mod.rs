//! Package snapshots and how they are assembled
//!
//! - `info.rs` - `PackageInfo`, its builder and the per-source fetch report
//! - `resolver.rs` - `PackageResolver`, registry + source-host orchestration
//! - `matcher.rs` - `TrustedPackageMatcher`
//! - `listing.rs` - AI artifact and hygiene heuristics over directory listings

#[cfg(test)]
pub(crate) mod fixtures;
mod info;
mod listing;
mod matcher;
mod resolver;

pub use info::{
    DataSource, FetchOutcome, FetchReport, FetchStatus, HygieneCounts, PackageInfo,
    PackageInfoBuilder, DEFAULT_RESPONSE_DAYS, UNKNOWN_LAST_COMMIT_DAYS,
};
pub use listing::{detect_ai_artifacts, hygiene_from_listing, AI_ARTIFACTS, README_CANDIDATES};
pub use matcher::TrustedPackageMatcher;
pub use resolver::{split_package_name, PackageResolver};
