//! Trust score composition
//!
//! # Scoring formula
//!
//! ```text
//! weighted_sum = Σ normalized_score × weight     (applicable, succeeding metrics)
//! bonus        = clamp(trust_bonus, -1, +1)
//! score        = clamp(100 × weighted_sum / 21 + 10 × bonus, 0, 100)
//! ```
//!
//! # Grades
//!
//! - A: 80 and above
//! - B: 60 and above
//! - C: 40 and above
//! - D: 20 and above
//! - F: below 20

mod calculator;
mod result;
mod trust_bonus;

pub use calculator::{ScoreCalculator, WEIGHT_DIVISOR};
pub use result::{Grade, MetricLevel, MetricResult, ScoreResult};
pub use trust_bonus::{TrustBonus, TrustBreakdown};
