//! Code hygiene from test coverage, TODO density and stubs
//!
//! ```text
//! tests = min((test_files / source_files) / 0.5, 1)
//! todo  = 1 - min((todos / loc) / 0.002, 1)
//! stub  = 1 - min(stubs / 10, 1)
//! hygiene = 0.5 * tests + 0.3 * todo + 0.2 * stub
//! ```

use super::{round_to, Measurement, Metric};
use crate::error::CptsResult;
use crate::package::PackageInfo;
use chrono::{DateTime, Utc};

const TARGET_TEST_RATIO: f64 = 0.5;
const TODO_RATIO_CEILING: f64 = 0.002;
const MAX_STUBS: f64 = 10.0;

const TESTS_WEIGHT: f64 = 0.5;
const TODO_WEIGHT: f64 = 0.3;
const STUB_WEIGHT: f64 = 0.2;

pub struct HygieneMetric;

impl Metric for HygieneMetric {
    fn name(&self) -> &'static str {
        "hygiene"
    }

    fn description(&self) -> &'static str {
        "Code hygiene (tests, TODOs, stubs)"
    }

    fn default_weight(&self) -> f64 {
        1.0
    }

    fn emoji(&self) -> &'static str {
        "🧹"
    }

    fn is_applicable(&self, package: &PackageInfo) -> bool {
        package.has_repository_data()
    }

    fn measure(&self, package: &PackageInfo, _now: DateTime<Utc>) -> CptsResult<Measurement> {
        let h = package.hygiene();

        let test_ratio = ratio(h.test_files, h.source_files);
        let tests = (test_ratio / TARGET_TEST_RATIO).min(1.0);
        let todo_ratio = ratio(h.todo_count, h.lines_of_code);
        let todo = 1.0 - (todo_ratio / TODO_RATIO_CEILING).min(1.0);
        let stub = 1.0 - (h.stub_count as f64 / MAX_STUBS).min(1.0);

        let normalized = TESTS_WEIGHT * tests + TODO_WEIGHT * todo + STUB_WEIGHT * stub;

        Ok(Measurement::new(normalized)
            .with("test_files", h.test_files)
            .with("src_files", h.source_files)
            .with("test_ratio", round_to(test_ratio, 3))
            .with("tests_norm", round_to(tests, 3))
            .with("todo_count", h.todo_count)
            .with("loc", h.lines_of_code)
            .with("todo_norm", round_to(todo, 3))
            .with("stub_count", h.stub_count)
            .with("stub_norm", round_to(stub, 3)))
    }
}

/// `part / whole`, 0 when `whole` is 0
fn ratio(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}
