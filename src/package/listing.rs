//! Heuristics over top-level directory listings
//!
//! - AI-tool configuration artifacts (`CLAUDE.md`, `.cursorrules`, ...)
//! - coarse hygiene counters from the presence of source/test directories

use super::info::HygieneCounts;
use crate::api::github::FileContent;

/// File or directory names left behind by AI coding tools
pub const AI_ARTIFACTS: &[&str] = &[
    "claude.md",
    "CLAUDE.md",
    ".claude",
    "gpt.md",
    "GPT.md",
    "prompt.md",
    "PROMPT.md",
    "system.md",
    "SYSTEM.md",
    ".cursorrules",
    ".cursor",
    ".continue",
    ".github/copilot-instructions.md",
    ".prompts",
    ".ai",
    ".llm",
];

const COPILOT_INSTRUCTIONS: &str = "copilot-instructions.md";
const COPILOT_PATH: &str = ".github/copilot-instructions.md";

/// README names tried in order
pub const README_CANDIDATES: &[&str] = &["README.md", "Readme.md", "readme.md", "README"];

const SOURCE_DIRS: &[&str] = &["src", "lib", "app"];
const TEST_DIRS: &[&str] = &["tests", "test", "spec"];

// Directory presence stands in for real counts until the tree is walked
const SOURCE_DIR_FILES: u64 = 10;
const TEST_DIR_FILES: u64 = 5;
const ASSUMED_LINES_OF_CODE: u64 = 1000;

fn is_artifact(entry: &FileContent) -> bool {
    AI_ARTIFACTS.iter().any(|artifact| {
        entry.name == *artifact
            || entry.path == *artifact
            || entry
                .path
                .strip_prefix(artifact)
                .is_some_and(|rest| rest.starts_with('/'))
    })
}

/// Paths of AI artifacts in the root listing and the `.github` listing,
/// deduplicated in first-seen order.
pub fn detect_ai_artifacts(root: &[FileContent], github_dir: &[FileContent]) -> Vec<String> {
    let mut detected: Vec<String> = Vec::new();
    let hits = root
        .iter()
        .filter(|e| is_artifact(e))
        .map(|e| e.path.clone())
        .chain(
            github_dir
                .iter()
                .filter(|e| e.name == COPILOT_INSTRUCTIONS)
                .map(|_| COPILOT_PATH.to_string()),
        );
    for path in hits {
        if !detected.contains(&path) {
            detected.push(path);
        }
    }
    detected
}

/// Placeholder hygiene counters derived from top-level directories
pub fn hygiene_from_listing(root: &[FileContent]) -> HygieneCounts {
    let dirs: Vec<String> = root
        .iter()
        .filter(|e| e.is_directory())
        .map(|e| e.name.to_lowercase())
        .collect();
    let has_any = |names: &[&str]| dirs.iter().any(|d| names.contains(&d.as_str()));

    HygieneCounts {
        source_files: if has_any(SOURCE_DIRS) { SOURCE_DIR_FILES } else { 0 },
        test_files: if has_any(TEST_DIRS) { TEST_DIR_FILES } else { 0 },
        lines_of_code: ASSUMED_LINES_OF_CODE,
        todo_count: 0,
        stub_count: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str, kind: &str) -> FileContent {
        FileContent {
            path: path.into(),
            name: path.rsplit('/').next().unwrap_or(path).into(),
            kind: kind.into(),
            size: 0,
            content: None,
            encoding: None,
        }
    }

    #[test]
    fn test_detects_root_artifacts() {
        let root = vec![
            entry("CLAUDE.md", "file"),
            entry(".cursor", "dir"),
            entry("src", "dir"),
            entry("README.md", "file"),
        ];
        assert_eq!(detect_ai_artifacts(&root, &[]), vec!["CLAUDE.md", ".cursor"]);
    }

    #[test]
    fn test_directory_style_prefix_match() {
        let root = vec![entry(".ai/prompts.md", "file"), entry(".aider", "file")];
        assert_eq!(detect_ai_artifacts(&root, &[]), vec![".ai/prompts.md"]);
    }

    #[test]
    fn test_copilot_instructions_deduplicated() {
        let root = vec![entry(".github/copilot-instructions.md", "file")];
        let github = vec![
            entry(".github/workflows", "dir"),
            entry(".github/copilot-instructions.md", "file"),
        ];
        assert_eq!(
            detect_ai_artifacts(&root, &github),
            vec![".github/copilot-instructions.md"]
        );
    }

    #[test]
    fn test_hygiene_from_listing() {
        let root = vec![entry("src", "dir"), entry("Tests", "dir"), entry("lib", "file")];
        let h = hygiene_from_listing(&root);
        assert_eq!(h.source_files, 10);
        assert_eq!(h.test_files, 5);
        assert_eq!(h.lines_of_code, 1000);
        assert_eq!(h.todo_count, 0);

        let h = hygiene_from_listing(&[entry("lib", "file")]);
        assert_eq!(h.source_files, 0);
        assert_eq!(h.test_files, 0);
    }
}
