//! Weighted-sum composition of metric results

use super::result::{MetricResult, ScoreResult};
use super::trust_bonus::TrustBonus;
use crate::error::CptsResult;
use crate::metrics::{MetricRegistry, WeightedMetric};
use crate::package::PackageInfo;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use tracing::{debug, error, info, warn};

/// Fixed divisor of the weighted sum
///
/// Not the sum of the default weights (25): scores are never renormalized
/// when metrics are skipped or reweighted.
pub const WEIGHT_DIVISOR: f64 = 21.0;
const TRUST_BONUS_MULTIPLIER: f64 = 10.0;
const TRUST_BONUS_LIMIT: f64 = 1.0;
const MAX_SCORE: f64 = 100.0;

/// Scores an assembled [`PackageInfo`]
///
/// ```text
/// score = clamp(100 * (Σ normalized·weight) / 21 + 10 * clamp(bonus, -1, 1), 0, 100)
/// ```
pub struct ScoreCalculator {
    registry: MetricRegistry,
    trust_bonus: TrustBonus,
}

impl ScoreCalculator {
    pub fn new(registry: MetricRegistry, trust_bonus: TrustBonus) -> Self {
        Self {
            registry,
            trust_bonus,
        }
    }

    pub fn registry(&self) -> &MetricRegistry {
        &self.registry
    }

    pub fn calculate(&self, package: &PackageInfo) -> CptsResult<ScoreResult> {
        self.calculate_at(package, Utc::now())
    }

    /// Score with every time window anchored at `now`.
    ///
    /// Only a rate limit fails the whole calculation; any other metric
    /// failure, including a panic, becomes a failed [`MetricResult`].
    pub fn calculate_at(&self, package: &PackageInfo, now: DateTime<Utc>) -> CptsResult<ScoreResult> {
        let mut metrics = IndexMap::new();
        let mut weighted_sum = 0.0;

        for entry in self.registry.metrics() {
            if !entry.metric().is_applicable(package) {
                debug!("{}: {} not applicable", package.name(), entry.name());
                continue;
            }
            let result = run_metric(entry, package, now)?;
            weighted_sum += result.weighted_score();
            metrics.insert(entry.name().to_string(), result);
        }

        let raw_trust_bonus = self.trust_bonus.calculate(package, now);
        let trust_bonus = raw_trust_bonus.clamp(-TRUST_BONUS_LIMIT, TRUST_BONUS_LIMIT);

        let base = 100.0 * (weighted_sum / WEIGHT_DIVISOR);
        let score = (base + TRUST_BONUS_MULTIPLIER * trust_bonus).clamp(0.0, MAX_SCORE);

        info!(
            "{}: score {:.1} (weighted {:.3}, bonus {:+.2})",
            package.name(),
            score,
            weighted_sum,
            trust_bonus
        );

        Ok(ScoreResult {
            package: package.name().to_string(),
            score,
            metrics,
            trust_bonus,
            raw_trust_bonus,
            calculated_at: now,
        })
    }
}

fn run_metric(
    entry: &WeightedMetric,
    package: &PackageInfo,
    now: DateTime<Utc>,
) -> CptsResult<MetricResult> {
    let name = entry.name();
    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        entry.calculate(package, now)
    }));

    match outcome {
        Ok(Ok(result)) => Ok(result),
        Ok(Err(e)) if e.is_rate_limit() => Err(e),
        Ok(Err(e)) => {
            warn!("Metric {} failed for {}: {}", name, package.name(), e);
            Ok(MetricResult::failed(name, e.to_string()))
        }
        Err(panic_info) => {
            let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic_info.downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            };
            error!("Metric {} panicked for {}: {}", name, package.name(), panic_msg);
            Ok(MetricResult::failed(name, format!("Panic: {}", panic_msg)))
        }
    }
}
