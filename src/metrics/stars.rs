use super::{log_scale, round_to, Measurement, Metric};
use crate::error::CptsResult;
use crate::package::PackageInfo;
use chrono::{DateTime, Utc};

/// Attention signal, log-scaled so that 10k stars saturate
pub struct StarsMetric;

impl Metric for StarsMetric {
    fn name(&self) -> &'static str {
        "stars"
    }

    fn description(&self) -> &'static str {
        "GitHub stars (attention signal)"
    }

    fn default_weight(&self) -> f64 {
        1.0
    }

    fn emoji(&self) -> &'static str {
        "⭐"
    }

    fn is_applicable(&self, package: &PackageInfo) -> bool {
        package.has_repository_data()
    }

    fn measure(&self, package: &PackageInfo, _now: DateTime<Utc>) -> CptsResult<Measurement> {
        let stars = package.stars();
        Ok(Measurement::new(log_scale(stars))
            .with("stars", stars)
            .with("log_value", round_to((stars as f64 + 1.0).log10(), 3)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::fixtures::{now, repository};

    fn measure(stars: u64) -> Measurement {
        let repo = crate::api::github::Repository {
            stars,
            ..repository()
        };
        let info = PackageInfo::builder("acme/widgets")
            .repository(Some(repo))
            .build();
        StarsMetric.measure(&info, now()).unwrap()
    }

    #[test]
    fn test_ten_thousand_saturates() {
        let m = measure(9999);
        assert!((m.normalized - 1.0).abs() < 1e-12);
        assert_eq!(m.raw["log_value"], 4.0);
        assert_eq!(measure(250_000).normalized, 1.0);
    }

    #[test]
    fn test_no_stars_scores_zero() {
        let m = measure(0);
        assert_eq!(m.normalized, 0.0);
        assert_eq!(m.raw["stars"], 0);
    }
}
