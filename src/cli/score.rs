//! `cpts score` - single package breakdown

use super::{project_root, styled_grade, styled_level, Scoring};
use anyhow::{bail, Context, Result};
use chrono::Utc;
use console::style;
use cpts::config::is_disabled;
use cpts::scoring::{MetricResult, ScoreCalculator, ScoreResult};
use cpts::CptsError;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub fn run(path: &Path, package: &str, format: &str, no_cache: bool, workers: usize) -> Result<()> {
    if is_disabled() {
        println!("CPTS is disabled via CPTS_DISABLE");
        return Ok(());
    }

    let root = project_root(path)?;
    let Scoring {
        config,
        resolver,
        calculator,
    } = Scoring::build(&root, no_cache)?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .context("Failed to build thread pool")?;
    let resolver = resolver.with_thread_pool(Arc::new(pool));

    let spinner = if format == "detailed" {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
                .template("{spinner:.green} {msg}")
                .expect("valid template"),
        );
        pb.set_message(format!("Fetching data for {}...", package));
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    let outcome = resolver.resolve(package).and_then(|info| {
        calculator
            .calculate(&info)
            .map(|result| (result, info.fetch_report().clone()))
    });

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let (result, report) = match outcome {
        Ok(r) => r,
        Err(e @ CptsError::RateLimited { .. }) => {
            let wait = e.seconds_until_reset(Utc::now()).unwrap_or(0);
            bail!("{} (retry in {}s, or set GITHUB_TOKEN)", e, wait);
        }
        Err(e) => return Err(e).with_context(|| format!("Failed to score {}", package)),
    };

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        "minimal" => {
            println!("{:.1}", result.score);
        }
        _ => {
            print_detailed(&result, &calculator, config.min_cpts);
            for (source, reason) in report.failures() {
                println!(
                    "  {} {} unavailable: {}",
                    style("note:").dim(),
                    source.as_str(),
                    reason
                );
            }
            if !result.meets(config.min_cpts) {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn print_detailed(result: &ScoreResult, calculator: &ScoreCalculator, min_cpts: u32) {
    let score_text = format!("{:.1}", result.score);
    let score = match result.score {
        s if s >= 80.0 => style(score_text).green(),
        s if s >= 60.0 => style(score_text).yellow(),
        s if s >= 40.0 => style(score_text).cyan(),
        _ => style(score_text).red(),
    };

    println!();
    println!("{} {}", style("Package:").bold(), result.package);
    println!(
        "{} {} / 100 (Grade: {})",
        style("CPTS Score:").bold(),
        score.bold(),
        styled_grade(result.grade())
    );
    println!(
        "{} {:+.2} (raw: {:+.2})",
        style("Trust Bonus:").bold(),
        result.trust_bonus,
        result.raw_trust_bonus
    );
    println!("{} {}", style("Min CPTS:").bold(), min_cpts);
    let status = if result.meets(min_cpts) {
        style("PASS").green().bold()
    } else {
        style("FAIL").red().bold()
    };
    println!("{} {}", style("Status:").bold(), status);

    println!();
    println!("{}", style("Metric Breakdown:").bold());
    if result.metrics.is_empty() {
        println!("  {}", style("no metric applied (no repository or registry data)").dim());
    }
    for (name, metric) in &result.metrics {
        let emoji = calculator
            .registry()
            .get(name)
            .map(|m| m.metric().emoji())
            .unwrap_or("•");
        println!("  {} {}", emoji, metric_line(name, metric));
    }

    println!();
    println!(
        "{}",
        style(format!(
            "Calculated: {}",
            result.calculated_at.format("%Y-%m-%d %H:%M:%S")
        ))
        .dim()
    );
}

fn metric_line(name: &str, metric: &MetricResult) -> String {
    if metric.failed {
        return format!(
            "{:<20} {} ({})",
            name,
            style("FAILED").red(),
            metric.error.as_deref().unwrap_or("unknown error")
        );
    }
    let value = styled_level(
        metric.level(),
        format!("{:.2}", metric.normalized_score),
    );
    format!(
        "{:<20} {} (weight: {:.1}, contribution: {:.2})",
        name,
        value,
        metric.weight,
        metric.weighted_score()
    )
}
