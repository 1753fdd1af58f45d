//! Score output records
//!
//! Stored values are never rounded; rounding happens only when a result is
//! serialized (score to 1 decimal, sub-scores to 3, trust bonus to 2).

use crate::metrics::round_to;
use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::ser::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Outcome of one metric for one package
#[derive(Debug, Clone, PartialEq)]
pub struct MetricResult {
    pub name: String,
    /// In `[0, 1]`, higher is better
    pub normalized_score: f64,
    pub weight: f64,
    pub raw: IndexMap<String, Value>,
    pub failed: bool,
    pub error: Option<String>,
}

impl MetricResult {
    pub fn new(
        name: impl Into<String>,
        normalized_score: f64,
        weight: f64,
        raw: IndexMap<String, Value>,
    ) -> Self {
        Self {
            name: name.into(),
            normalized_score,
            weight,
            raw,
            failed: false,
            error: None,
        }
    }

    /// Zero-score, zero-weight entry carrying the failure for display
    pub fn failed(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            normalized_score: 0.0,
            weight: 0.0,
            raw: IndexMap::new(),
            failed: true,
            error: Some(error.into()),
        }
    }

    pub fn weighted_score(&self) -> f64 {
        self.normalized_score * self.weight
    }

    pub fn level(&self) -> MetricLevel {
        MetricLevel::of(self)
    }
}

impl Serialize for MetricResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(serde::Serialize)]
        struct View<'a> {
            normalized_score: f64,
            weight: f64,
            weighted_score: f64,
            raw: &'a IndexMap<String, Value>,
            failed: bool,
            error: Option<&'a str>,
        }

        View {
            normalized_score: round_to(self.normalized_score, 3),
            weight: self.weight,
            weighted_score: round_to(self.weighted_score(), 3),
            raw: &self.raw,
            failed: self.failed,
            error: self.error.as_deref(),
        }
        .serialize(serializer)
    }
}

/// Letter grade for a final score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Grade::A
        } else if score >= 60.0 {
            Grade::B
        } else if score >= 40.0 {
            Grade::C
        } else if score >= 20.0 {
            Grade::D
        } else {
            Grade::F
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Grade {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Severity bucket of a single metric, best first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MetricLevel {
    Excellent,
    Good,
    Caution,
    Warning,
    Fail,
}

impl MetricLevel {
    pub fn from_normalized(score: f64) -> Self {
        if score >= 0.8 {
            MetricLevel::Excellent
        } else if score >= 0.6 {
            MetricLevel::Good
        } else if score >= 0.4 {
            MetricLevel::Caution
        } else if score >= 0.2 {
            MetricLevel::Warning
        } else {
            MetricLevel::Fail
        }
    }

    /// Failed metrics are always [`MetricLevel::Fail`]
    pub fn of(result: &MetricResult) -> Self {
        if result.failed {
            MetricLevel::Fail
        } else {
            Self::from_normalized(result.normalized_score)
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            MetricLevel::Excellent => "✓",
            MetricLevel::Good => "✓",
            MetricLevel::Caution => "~",
            MetricLevel::Warning => "!",
            MetricLevel::Fail => "✗",
        }
    }
}

/// Final trust score of one package
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreResult {
    pub package: String,
    /// In `[0, 100]`
    pub score: f64,
    /// Keyed by metric name, in registry order
    pub metrics: IndexMap<String, MetricResult>,
    /// Clamped to `[-1, 1]`
    pub trust_bonus: f64,
    pub raw_trust_bonus: f64,
    pub calculated_at: DateTime<Utc>,
}

impl ScoreResult {
    pub fn grade(&self) -> Grade {
        Grade::from_score(self.score)
    }

    pub fn metric(&self, name: &str) -> Option<&MetricResult> {
        self.metrics.get(name)
    }

    pub fn failed_metrics(&self) -> impl Iterator<Item = &MetricResult> {
        self.metrics.values().filter(|m| m.failed)
    }

    pub fn meets(&self, min_score: u32) -> bool {
        self.score >= f64::from(min_score)
    }
}

impl Serialize for ScoreResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(serde::Serialize)]
        struct View<'a> {
            package: &'a str,
            score: f64,
            grade: Grade,
            trust_bonus: f64,
            raw_trust_bonus: f64,
            calculated_at: String,
            metrics: &'a IndexMap<String, MetricResult>,
        }

        View {
            package: &self.package,
            score: round_to(self.score, 1),
            grade: self.grade(),
            trust_bonus: round_to(self.trust_bonus, 2),
            raw_trust_bonus: round_to(self.raw_trust_bonus, 2),
            calculated_at: self
                .calculated_at
                .to_rfc3339_opts(SecondsFormat::Secs, false),
            metrics: &self.metrics,
        }
        .serialize(serializer)
    }
}
