//! `cpts check` - score every locked dependency

use super::{metric_header, metric_strip, project_root, Scoring};
use anyhow::{bail, Result};
use console::style;
use cpts::config::is_disabled;
use cpts::gate::{GateSummary, TrustGate, Validation, ValidationStatus};
use cpts::lockfile::{LockFile, LOCK_FILE};
use cpts::metrics::MetricRegistry;
use cpts::package::TrustedPackageMatcher;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use std::path::Path;

const UNAUTHENTICATED_WARN_THRESHOLD: usize = 30;
const LOW_RATE_LIMIT: u32 = 10;

pub fn run(
    path: &Path,
    format: &str,
    fail_under: Option<u32>,
    no_cache: bool,
    dev: bool,
    only: Option<&str>,
    workers: usize,
) -> Result<()> {
    if is_disabled() {
        println!("CPTS is disabled via CPTS_DISABLE");
        return Ok(());
    }

    let root = project_root(path)?;
    let Some(lock) = LockFile::load(&root)? else {
        bail!("No {} found in {}", LOCK_FILE, root.display());
    };

    let mut packages = lock.package_names(dev);
    if let Some(only) = only {
        packages.retain(|p| p == only);
        if packages.is_empty() {
            bail!("Package {} is not in {}", only, LOCK_FILE);
        }
    }
    if packages.is_empty() {
        println!("No packages to check");
        return Ok(());
    }

    let Scoring {
        config,
        resolver,
        calculator,
    } = Scoring::build(&root, no_cache)?;
    let threshold = fail_under.unwrap_or(config.min_cpts);
    let table = format == "table";

    if table
        && !resolver.source_host().is_authenticated()
        && packages.len() > UNAUTHENTICATED_WARN_THRESHOLD
    {
        eprintln!(
            "{} checking {} packages without GITHUB_TOKEN (60 requests/hour); expect rate limiting",
            style("Warning:").yellow().bold(),
            packages.len()
        );
    }

    let matcher = TrustedPackageMatcher::new(&config.trusted_packages);
    let mut gate = TrustGate::new(matcher, resolver, calculator, threshold).with_workers(workers);

    let bar = if table {
        let pb = ProgressBar::new(packages.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .expect("valid progress template")
                .progress_chars("█▓▒░  "),
        );
        let callback_bar = pb.clone();
        gate = gate.with_progress_callback(Box::new(move |package, done, _total| {
            callback_bar.set_position(done as u64);
            callback_bar.set_message(package.to_string());
        }));
        Some(pb)
    } else {
        None
    };

    let validations = gate.evaluate_all(&packages);
    if let Some(pb) = bar {
        pb.finish_and_clear();
    }
    let summary = GateSummary::from_validations(&validations);

    if table {
        print_table(&validations, gate.calculator().registry());
        println!();
        println!("Checked {} packages: {}", summary.total(), summary);

        let host = gate.resolver().source_host();
        let remaining = host.remaining_rate_limit();
        if summary.rate_limited > 0 || remaining < LOW_RATE_LIMIT {
            let auth = if host.is_authenticated() {
                String::new()
            } else {
                format!(" ({} requests remaining, set GITHUB_TOKEN)", remaining)
            };
            println!(
                "{} GitHub API rate limit nearly exhausted{}",
                style("Warning:").yellow().bold(),
                auth
            );
        }
    } else {
        println!("{}", serde_json::to_string_pretty(&json_report(&validations, &summary))?);
    }

    if fail_under.is_some() && summary.failed > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn print_table(validations: &[Validation], registry: &MetricRegistry) {
    println!(
        "{:<45} {:>7}  {}",
        style("Package").bold(),
        style("Score").bold(),
        metric_header(registry)
    );
    println!("{}", "-".repeat(80));

    for v in validations {
        let name = format!("{:<45}", v.package);
        match (v.status, &v.score) {
            (ValidationStatus::Trusted, _) => {
                println!("{} {:>7}", name, style("TRUSTED").cyan());
            }
            (ValidationStatus::Pass | ValidationStatus::Fail, Some(score)) => {
                let value = format!("{:>7.1}", score.score);
                let value = if v.status == ValidationStatus::Pass {
                    style(value).green()
                } else {
                    style(value).red()
                };
                let low = if v.status == ValidationStatus::Fail {
                    format!("  {}", style("LOW").red().bold())
                } else {
                    String::new()
                };
                println!("{} {}  {}{}", name, value, metric_strip(score, registry), low);
            }
            (status, _) => {
                println!(
                    "{} {:>7}  {}",
                    name,
                    style(status.as_str()).yellow(),
                    style(v.error.as_deref().unwrap_or("")).dim()
                );
            }
        }
    }
}

fn json_report(validations: &[Validation], summary: &GateSummary) -> serde_json::Value {
    let packages: Vec<_> = validations
        .iter()
        .map(|v| {
            json!({
                "name": v.package,
                "score": v.score_value().map(|s| (s * 10.0).round() / 10.0),
                "grade": v.score.as_ref().map(|s| s.grade()),
                "status": v.status.as_str(),
            })
        })
        .collect();

    json!({
        "packages": packages,
        "summary": {
            "total": summary.total(),
            "passed": summary.passed,
            "failed": summary.failed,
            "trusted": summary.trusted,
            "rate_limited": summary.rate_limited,
            "errors": summary.errors,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validation(package: &str, status: ValidationStatus) -> Validation {
        Validation {
            package: package.into(),
            status,
            score: None,
            error: None,
        }
    }

    #[test]
    fn test_json_report_shape() {
        let validations = vec![
            validation("symfony/console", ValidationStatus::Trusted),
            validation("acme/widgets", ValidationStatus::RateLimited),
        ];
        let summary = GateSummary::from_validations(&validations);
        let report = json_report(&validations, &summary);

        assert_eq!(report["packages"][0]["name"], "symfony/console");
        assert_eq!(report["packages"][0]["status"], "TRUSTED");
        assert!(report["packages"][0]["score"].is_null());
        assert_eq!(report["packages"][1]["status"], "RATE_LIMITED");
        assert_eq!(report["summary"]["total"], 2);
        assert_eq!(report["summary"]["trusted"], 1);
        assert_eq!(report["summary"]["rate_limited"], 1);
        assert_eq!(report["summary"]["errors"], 0);
    }
}
