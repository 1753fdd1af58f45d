//! AI-workflow risk score (AIRS)
//!
//! Three weighted heuristics, each in `[0, 1]`:
//!
//! ```text
//! airs = 100 * (0.5 * artifacts + 0.2 * readme + 0.3 * git)
//! normalized = 1 - airs / 100
//! ```
//!
//! - **artifacts**: AI tool configuration files in the repository
//! - **readme**: emoji section headings and boilerplate section sets
//! - **git**: verbose or generic commit messages

use super::{round_to, Measurement, Metric};
use crate::api::github::Commit;
use crate::error::CptsResult;
use crate::package::PackageInfo;
use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::OnceLock;

const ARTIFACT_WEIGHT: f64 = 0.5;
const README_WEIGHT: f64 = 0.2;
const GIT_WEIGHT: f64 = 0.3;

const LONG_MESSAGE_BYTES: usize = 120;

/// Section titles typical of generated READMEs, matched case-insensitively
const POLISHED_SECTIONS: &[&str] = &[
    "features",
    "installation",
    "usage",
    "configuration",
    "contributing",
    "license",
    "getting started",
    "quick start",
    "requirements",
];

static EMOJI_HEADING: OnceLock<Regex> = OnceLock::new();

fn emoji_heading() -> &'static Regex {
    EMOJI_HEADING.get_or_init(|| Regex::new(r"(?m)^##\s+[\x{1F300}-\x{1F9FF}]").unwrap())
}

pub struct AirsMetric;

impl Metric for AirsMetric {
    fn name(&self) -> &'static str {
        "airs"
    }

    fn description(&self) -> &'static str {
        "AI-workflow risk score (lower is better)"
    }

    fn default_weight(&self) -> f64 {
        3.0
    }

    fn emoji(&self) -> &'static str {
        "🤖"
    }

    fn is_applicable(&self, package: &PackageInfo) -> bool {
        package.has_repository_data()
    }

    fn higher_is_better(&self) -> bool {
        false
    }

    fn measure(&self, package: &PackageInfo, _now: DateTime<Utc>) -> CptsResult<Measurement> {
        let artifacts = package.detected_ai_artifacts();
        let artifact = artifact_score(artifacts.len());
        let readme = readme_score(package.readme_content().unwrap_or_default());
        let git = git_score(package.recent_commits());

        let airs = 100.0 * (ARTIFACT_WEIGHT * artifact + README_WEIGHT * readme + GIT_WEIGHT * git);

        Ok(Measurement::new(1.0 - airs / 100.0)
            .with("airs_score", round_to(airs, 2))
            .with("artifact_score", round_to(artifact, 3))
            .with("readme_score", round_to(readme, 3))
            .with("git_score", round_to(git, 3))
            .with("detected_artifacts", artifacts.to_vec()))
    }
}

/// 0 hits score 0; one hit 0.5, two 0.75, three or more 1.0
pub(crate) fn artifact_score(count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    (0.25 + 0.25 * count as f64).min(1.0)
}

pub(crate) fn readme_score(readme: &str) -> f64 {
    if readme.is_empty() {
        return 0.0;
    }
    let mut score: f64 = 0.0;

    let emoji_headings = emoji_heading().find_iter(readme).count();
    if emoji_headings >= 3 {
        score += 0.6;
    } else if emoji_headings >= 1 {
        score += 0.3;
    }

    // "# x" also covers "## x"
    let lower = readme.to_lowercase();
    let sections = POLISHED_SECTIONS
        .iter()
        .filter(|s| lower.contains(&format!("# {s}")))
        .count();
    if sections >= 6 {
        score += 0.4;
    } else if sections >= 4 {
        score += 0.2;
    }

    score.min(1.0)
}

pub(crate) fn git_score(commits: &[Commit]) -> f64 {
    if commits.is_empty() {
        return 0.0;
    }
    let total = commits.len() as f64;
    let long = commits
        .iter()
        .filter(|c| c.message_len() > LONG_MESSAGE_BYTES)
        .count() as f64;
    let generic = commits.iter().filter(|c| c.is_generic_message()).count() as f64;

    let mut score: f64 = 0.0;
    let long_ratio = long / total;
    if long_ratio >= 0.5 {
        score += 0.5;
    } else if long_ratio >= 0.25 {
        score += 0.25;
    }

    let generic_ratio = generic / total;
    if generic_ratio >= 0.3 {
        score += 0.5;
    } else if generic_ratio >= 0.15 {
        score += 0.25;
    }

    score.min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::fixtures::{commit_with_message, now, repository};

    #[test]
    fn test_artifact_score_steps() {
        assert_eq!(artifact_score(0), 0.0);
        assert_eq!(artifact_score(1), 0.5);
        assert_eq!(artifact_score(2), 0.75);
        assert_eq!(artifact_score(3), 1.0);
        assert_eq!(artifact_score(7), 1.0);
    }

    #[test]
    fn test_readme_emoji_and_sections() {
        assert_eq!(readme_score(""), 0.0);
        assert_eq!(readme_score("# widgets\n\nSmall library."), 0.0);

        let one_emoji = "## 🚀 Launch\nText";
        assert!((readme_score(one_emoji) - 0.3).abs() < 1e-12);

        let polished = "\
## 🚀 Launch\n## 📦 Packages\n## 🔧 Tooling\n\
## Features\n## Installation\n## Usage\n\
## Configuration\n## Contributing\n# License\n";
        // three emoji headings and six polished sections
        assert!((readme_score(polished) - 1.0).abs() < 1e-12);

        // emoji between the hashes and the title hides the section name
        let emoji_sections = "\
## 🚀 Features\n## 📦 Installation\n## 🔧 Usage\n\
## Configuration\n## Contributing\n# License\n";
        assert!((readme_score(emoji_sections) - 0.6).abs() < 1e-12);

        let four_sections = "## Features\n## Installation\n## Usage\n## License\n";
        assert!((readme_score(four_sections) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_emoji_heading_must_start_line() {
        assert_eq!(readme_score("text ## 🚀 Launch"), 0.0);
        // level-3 headings do not count
        assert_eq!(readme_score("### 🚀 Launch"), 0.0);
    }

    #[test]
    fn test_git_score_thresholds() {
        assert_eq!(git_score(&[]), 0.0);

        let long = "x".repeat(121);
        let commits = vec![
            commit_with_message(1, &long),
            commit_with_message(2, &long),
            commit_with_message(3, "fix"),
            commit_with_message(4, "Refine caching of parsed manifests"),
        ];
        // long 50%, generic 25%
        assert!((git_score(&commits) - 0.75).abs() < 1e-12);

        let exactly_120 = "y".repeat(120);
        assert_eq!(git_score(&[commit_with_message(1, &exactly_120)]), 0.0);
    }

    #[test]
    fn test_clean_repository_scores_full() {
        let info = PackageInfo::builder("acme/widgets")
            .repository(Some(repository()))
            .commits(vec![commit_with_message(1, "Refine caching of parsed manifests")])
            .readme_content(Some("# widgets".into()))
            .build();

        let m = AirsMetric.measure(&info, now()).unwrap();
        assert_eq!(m.normalized, 1.0);
        assert_eq!(m.raw["airs_score"], 0.0);
        assert_eq!(m.raw["detected_artifacts"], serde_json::json!([]));
    }

    #[test]
    fn test_ai_heavy_repository() {
        let info = PackageInfo::builder("acme/widgets")
            .repository(Some(repository()))
            .detected_ai_artifacts(vec!["CLAUDE.md".into(), ".cursorrules".into()])
            .commits(vec![commit_with_message(1, "update")])
            .build();

        let m = AirsMetric.measure(&info, now()).unwrap();
        // 100 * (0.5 * 0.75 + 0.3 * 0.5) = 52.5
        assert_eq!(m.raw["airs_score"], 52.5);
        assert!((m.normalized - 0.475).abs() < 1e-12);
        assert_eq!(
            m.raw["detected_artifacts"],
            serde_json::json!(["CLAUDE.md", ".cursorrules"])
        );
        assert!(!AirsMetric.higher_is_better());
    }
}
