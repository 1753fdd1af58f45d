//! Pass/fail gate for dependency installation
//!
//! Trusted packages are accepted without any remote lookup. Everything else
//! is resolved, scored and compared against the configured minimum.

use crate::package::{PackageResolver, TrustedPackageMatcher};
use crate::scoring::{ScoreCalculator, ScoreResult};
use rayon::prelude::*;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info, warn};

/// Progress callback: (package, done, total)
pub type ProgressCallback = Box<dyn Fn(&str, usize, usize) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationStatus {
    Pass,
    Fail,
    Trusted,
    RateLimited,
    Error,
}

impl ValidationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationStatus::Pass => "PASS",
            ValidationStatus::Fail => "FAIL",
            ValidationStatus::Trusted => "TRUSTED",
            ValidationStatus::RateLimited => "RATE_LIMITED",
            ValidationStatus::Error => "ERROR",
        }
    }
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gate verdict for one package
#[derive(Debug, Clone)]
pub struct Validation {
    pub package: String,
    pub status: ValidationStatus,
    pub score: Option<ScoreResult>,
    pub error: Option<String>,
}

impl Validation {
    fn trusted(package: &str) -> Self {
        Self {
            package: package.to_string(),
            status: ValidationStatus::Trusted,
            score: None,
            error: None,
        }
    }

    fn failed(package: &str, status: ValidationStatus, error: String) -> Self {
        Self {
            package: package.to_string(),
            status,
            score: None,
            error: Some(error),
        }
    }

    /// Pass and Trusted let the install proceed
    pub fn is_passing(&self) -> bool {
        matches!(
            self.status,
            ValidationStatus::Pass | ValidationStatus::Trusted
        )
    }

    pub fn score_value(&self) -> Option<f64> {
        self.score.as_ref().map(|s| s.score)
    }
}

pub struct TrustGate {
    matcher: TrustedPackageMatcher,
    resolver: PackageResolver,
    calculator: ScoreCalculator,
    min_score: u32,
    workers: usize,
    progress_callback: Option<ProgressCallback>,
}

impl TrustGate {
    pub fn new(
        matcher: TrustedPackageMatcher,
        resolver: PackageResolver,
        calculator: ScoreCalculator,
        min_score: u32,
    ) -> Self {
        Self {
            matcher,
            resolver,
            calculator,
            min_score,
            workers: 0,
            progress_callback: None,
        }
    }

    /// Packages scored concurrently by [`evaluate_all`](Self::evaluate_all) (0 = auto)
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn min_score(&self) -> u32 {
        self.min_score
    }

    pub fn resolver(&self) -> &PackageResolver {
        &self.resolver
    }

    pub fn calculator(&self) -> &ScoreCalculator {
        &self.calculator
    }

    pub fn evaluate(&self, package: &str) -> Validation {
        if self.matcher.matches(package) {
            debug!("{} is trusted", package);
            return Validation::trusted(package);
        }

        let score = self
            .resolver
            .resolve(package)
            .and_then(|info| self.calculator.calculate(&info));

        match score {
            Ok(score) => {
                let status = if score.meets(self.min_score) {
                    ValidationStatus::Pass
                } else {
                    ValidationStatus::Fail
                };
                Validation {
                    package: package.to_string(),
                    status,
                    score: Some(score),
                    error: None,
                }
            }
            Err(e) if e.is_rate_limit() => {
                warn!("{}: {}", package, e);
                Validation::failed(package, ValidationStatus::RateLimited, e.to_string())
            }
            Err(e) => {
                warn!("{}: {}", package, e);
                Validation::failed(package, ValidationStatus::Error, e.to_string())
            }
        }
    }

    /// Evaluate every package, in input order
    pub fn evaluate_all(&self, packages: &[String]) -> Vec<Validation> {
        let total = packages.len();
        let completed = AtomicUsize::new(0);
        info!("Evaluating {} packages on {} workers", total, self.worker_count());

        let run = || -> Vec<Validation> {
            packages
                .par_iter()
                .map(|package| {
                    let validation = self.evaluate(package);
                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    if let Some(ref callback) = self.progress_callback {
                        callback(package, done, total);
                    }
                    validation
                })
                .collect()
        };

        match rayon::ThreadPoolBuilder::new()
            .num_threads(self.worker_count())
            .build()
        {
            Ok(pool) => pool.install(run),
            Err(e) => {
                warn!("Falling back to the global thread pool: {}", e);
                run()
            }
        }
    }

    fn worker_count(&self) -> usize {
        if self.workers == 0 {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
                .min(8)
        } else {
            self.workers
        }
    }
}

/// Status counts over a batch of validations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GateSummary {
    pub passed: usize,
    pub failed: usize,
    pub trusted: usize,
    pub rate_limited: usize,
    pub errors: usize,
}

impl GateSummary {
    pub fn from_validations<'a>(validations: impl IntoIterator<Item = &'a Validation>) -> Self {
        let mut summary = Self::default();
        for v in validations {
            match v.status {
                ValidationStatus::Pass => summary.passed += 1,
                ValidationStatus::Fail => summary.failed += 1,
                ValidationStatus::Trusted => summary.trusted += 1,
                ValidationStatus::RateLimited => summary.rate_limited += 1,
                ValidationStatus::Error => summary.errors += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed + self.trusted + self.rate_limited + self.errors
    }

    pub fn all_passing(&self) -> bool {
        self.failed == 0 && self.rate_limited == 0 && self.errors == 0
    }
}

impl fmt::Display for GateSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} passed, {} failed, {} trusted, {} rate limited, {} errors",
            self.passed,
            self.failed,
            self.trusted,
            self.rate_limited,
            self.errors
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validation(status: ValidationStatus) -> Validation {
        Validation {
            package: "acme/widgets".into(),
            status,
            score: None,
            error: None,
        }
    }

    #[test]
    fn test_passing_statuses() {
        assert!(validation(ValidationStatus::Pass).is_passing());
        assert!(validation(ValidationStatus::Trusted).is_passing());
        assert!(!validation(ValidationStatus::Fail).is_passing());
        assert!(!validation(ValidationStatus::RateLimited).is_passing());
        assert!(!validation(ValidationStatus::Error).is_passing());
    }

    #[test]
    fn test_summary_counts() {
        let all = [
            validation(ValidationStatus::Pass),
            validation(ValidationStatus::Pass),
            validation(ValidationStatus::Fail),
            validation(ValidationStatus::Trusted),
            validation(ValidationStatus::RateLimited),
            validation(ValidationStatus::Error),
        ];
        let summary = GateSummary::from_validations(&all);
        assert_eq!(summary.passed, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.trusted, 1);
        assert_eq!(summary.rate_limited, 1);
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.total(), 6);
        assert!(!summary.all_passing());
        assert_eq!(summary.to_string(), "2 passed, 1 failed, 1 trusted, 1 rate limited, 1 errors");
    }

    #[test]
    fn test_empty_summary_passes() {
        let summary = GateSummary::from_validations(&Vec::<Validation>::new());
        assert!(summary.all_passing());
        assert_eq!(summary.total(), 0);
    }
}
