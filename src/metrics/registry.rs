//! Ordered metric set with effective weights

use super::{
    ActivityMetric, AirsMetric, CommittersMetric, DependencyCountMetric, DependentsMetric,
    HygieneMetric, IssueBehaviourMetric, Metric, RepoAgeMetric, StarsMetric,
};
use crate::error::{CptsError, CptsResult};
use crate::package::PackageInfo;
use crate::scoring::MetricResult;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::warn;

/// A metric together with the weight it is scored at
pub struct WeightedMetric {
    metric: Box<dyn Metric>,
    weight: f64,
}

impl WeightedMetric {
    pub fn metric(&self) -> &dyn Metric {
        self.metric.as_ref()
    }

    pub fn name(&self) -> &'static str {
        self.metric.name()
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Measure and wrap into a [`MetricResult`] at this weight.
    ///
    /// The normalized value is clamped to `[0, 1]`; a non-finite value is a
    /// calculation error.
    pub fn calculate(&self, package: &PackageInfo, now: DateTime<Utc>) -> CptsResult<MetricResult> {
        let measurement = self.metric.measure(package, now)?;
        if !measurement.normalized.is_finite() {
            return Err(CptsError::ScoreCalculation {
                package: package.name().to_string(),
                metric: self.name().to_string(),
                message: format!("non-finite value {}", measurement.normalized),
            });
        }
        Ok(MetricResult::new(
            self.name(),
            measurement.normalized.clamp(0.0, 1.0),
            self.weight,
            measurement.raw,
        ))
    }
}

/// Metrics in registration order, which is also display order
#[derive(Default)]
pub struct MetricRegistry {
    metrics: Vec<WeightedMetric>,
    overrides: HashMap<String, f64>,
}

impl MetricRegistry {
    /// Empty registry; `overrides` replace default weights by metric name
    pub fn new(overrides: HashMap<String, f64>) -> Self {
        Self {
            metrics: Vec::new(),
            overrides,
        }
    }

    /// The nine built-in metrics
    pub fn with_defaults(overrides: &HashMap<String, f64>) -> Self {
        let mut registry = Self::new(overrides.clone());
        registry.register(Box::new(AirsMetric));
        registry.register(Box::new(ActivityMetric));
        registry.register(Box::new(CommittersMetric));
        registry.register(Box::new(StarsMetric));
        registry.register(Box::new(DependentsMetric));
        registry.register(Box::new(RepoAgeMetric));
        registry.register(Box::new(HygieneMetric));
        registry.register(Box::new(IssueBehaviourMetric));
        registry.register(Box::new(DependencyCountMetric));

        for name in registry.overrides.keys() {
            if registry.get(name).is_none() {
                warn!("Weight override for unknown metric '{}' ignored", name);
            }
        }
        registry
    }

    /// Add a metric; registering a name again replaces it in place
    pub fn register(&mut self, metric: Box<dyn Metric>) {
        let weight = self
            .overrides
            .get(metric.name())
            .copied()
            .unwrap_or_else(|| metric.default_weight());
        let entry = WeightedMetric { metric, weight };

        match self.metrics.iter_mut().find(|m| m.name() == entry.name()) {
            Some(slot) => *slot = entry,
            None => self.metrics.push(entry),
        }
    }

    pub fn get(&self, name: &str) -> Option<&WeightedMetric> {
        self.metrics.iter().find(|m| m.name() == name)
    }

    pub fn metrics(&self) -> &[WeightedMetric] {
        &self.metrics
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Sum of effective weights; informational only, scores divide by 21
    pub fn total_weight(&self) -> f64 {
        self.metrics.iter().map(WeightedMetric::weight).sum()
    }
}
