//! Environment overrides: `GITHUB_TOKEN` and `CPTS_DISABLE`

use std::path::Path;

pub const TOKEN_VAR: &str = "GITHUB_TOKEN";
pub const DISABLE_VAR: &str = "CPTS_DISABLE";

/// Source-host token: the environment first, then the project's `.env`
pub fn github_token(project_root: &Path) -> Option<String> {
    if let Ok(token) = std::env::var(TOKEN_VAR) {
        if !token.is_empty() {
            return Some(token);
        }
    }
    let content = std::fs::read_to_string(project_root.join(".env")).ok()?;
    parse_env_value(&content, TOKEN_VAR)
}

/// Value of `key` in dotenv-style content, surrounding quotes stripped
pub fn parse_env_value(content: &str, key: &str) -> Option<String> {
    let prefix = format!("{key}=");
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .find_map(|line| line.strip_prefix(&prefix))
        .map(|value| value.trim_matches(|c| c == '"' || c == '\'').to_string())
}

/// `CPTS_DISABLE` set to anything but empty or `0`
pub fn is_disabled() -> bool {
    disabled_value(std::env::var(DISABLE_VAR).ok().as_deref())
}

fn disabled_value(value: Option<&str>) -> bool {
    matches!(value, Some(v) if !v.is_empty() && v != "0")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_value() {
        let content = "# comment\nAPP_ENV=dev\n\nGITHUB_TOKEN=\"ghp_abc\"\nGITHUB_TOKEN=second\n";
        assert_eq!(parse_env_value(content, "GITHUB_TOKEN").as_deref(), Some("ghp_abc"));
        assert_eq!(parse_env_value(content, "APP_ENV").as_deref(), Some("dev"));
        assert_eq!(parse_env_value(content, "MISSING"), None);
    }

    #[test]
    fn test_parse_env_single_quotes_and_prefix_collision() {
        let content = "GITHUB_TOKEN_OLD=x\nGITHUB_TOKEN='tok'\n";
        assert_eq!(parse_env_value(content, "GITHUB_TOKEN").as_deref(), Some("tok"));
    }

    #[test]
    fn test_disabled_value() {
        assert!(!disabled_value(None));
        assert!(!disabled_value(Some("")));
        assert!(!disabled_value(Some("0")));
        assert!(disabled_value(Some("1")));
        assert!(disabled_value(Some("yes")));
    }
}
