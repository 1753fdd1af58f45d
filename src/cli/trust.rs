//! `cpts trust` - edit the trusted-package list

use super::project_root;
use anyhow::{Context, Result};
use console::style;
use cpts::config::{load_config, save_trusted_packages};
use std::path::Path;

pub fn run(path: &Path, packages: &[String], remove: bool) -> Result<()> {
    let root = project_root(path)?;
    let mut trusted = load_config(&root).trusted_packages;

    let changed = if remove {
        remove_patterns(&mut trusted, packages)
    } else {
        add_patterns(&mut trusted, packages)
    };

    if changed {
        let file = save_trusted_packages(&root, &trusted)
            .context("Failed to write trusted packages")?;
        println!("{} {}", style("Updated").green(), file.display());
    }
    Ok(())
}

/// Returns true when the list changed
fn add_patterns(trusted: &mut Vec<String>, packages: &[String]) -> bool {
    let mut changed = false;
    for package in packages {
        if trusted.contains(package) {
            println!("{} {}", style("Already trusted:").dim(), package);
        } else {
            println!("{} {}", style("Added:").green(), package);
            trusted.push(package.clone());
            changed = true;
        }
    }
    changed
}

fn remove_patterns(trusted: &mut Vec<String>, packages: &[String]) -> bool {
    let mut changed = false;
    for package in packages {
        match trusted.iter().position(|p| p == package) {
            Some(index) => {
                trusted.remove(index);
                println!("{} {}", style("Removed:").yellow(), package);
                changed = true;
            }
            None => println!("{} {}", style("Not found:").dim(), package),
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_add_skips_duplicates() {
        let mut trusted = names(&["symfony/*"]);
        assert!(add_patterns(&mut trusted, &names(&["symfony/*", "psr/log"])));
        assert_eq!(trusted, names(&["symfony/*", "psr/log"]));
        assert!(!add_patterns(&mut trusted, &names(&["psr/log"])));
    }

    #[test]
    fn test_remove_reports_missing() {
        let mut trusted = names(&["symfony/*", "psr/log"]);
        assert!(remove_patterns(&mut trusted, &names(&["psr/log", "acme/nope"])));
        assert_eq!(trusted, names(&["symfony/*"]));
        assert!(!remove_patterns(&mut trusted, &names(&["acme/nope"])));
    }

    #[test]
    fn test_run_writes_config() {
        let dir = tempfile::tempdir().unwrap();
        run(dir.path(), &names(&["monolog/*"]), false).unwrap();
        assert_eq!(load_config(dir.path()).trusted_packages, names(&["monolog/*"]));

        run(dir.path(), &names(&["monolog/*"]), true).unwrap();
        assert!(load_config(dir.path()).trusted_packages.is_empty());
    }
}
