//! Trusted-package exemption list

use regex::Regex;

/// Matches package names against exact names and `*` globs.
///
/// `*` matches any run of characters, including `/`.
#[derive(Debug, Clone, Default)]
pub struct TrustedPackageMatcher {
    patterns: Vec<String>,
    compiled: Vec<Regex>,
}

impl TrustedPackageMatcher {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns: Vec<String> = patterns.into_iter().map(Into::into).collect();
        let compiled = patterns
            .iter()
            .filter_map(|p| match pattern_to_regex(p) {
                Ok(re) => Some(re),
                Err(e) => {
                    tracing::warn!("Ignoring trust pattern {:?}: {}", p, e);
                    None
                }
            })
            .collect();
        Self { patterns, compiled }
    }

    pub fn matches(&self, package: &str) -> bool {
        if self.patterns.iter().any(|p| p == package) {
            return true;
        }
        self.compiled.iter().any(|re| re.is_match(package))
    }

    /// Patterns exactly as configured
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

fn pattern_to_regex(pattern: &str) -> Result<Regex, regex::Error> {
    let body = regex::escape(pattern).replace(r"\*", ".*");
    Regex::new(&format!("^{body}$"))
}
