//! CLI command definitions and handlers

mod check;
mod score;
mod trust;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use cpts::api::github::GitHubClient;
use cpts::api::packagist::PackagistClient;
use cpts::cache::{ensure_cache_dir, Cache, FilesystemCache, NullCache};
use cpts::config::{github_token, load_config, CptsConfig};
use cpts::metrics::MetricRegistry;
use cpts::package::PackageResolver;
use cpts::scoring::{Grade, MetricLevel, ScoreCalculator, ScoreResult, TrustBonus};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Parse and validate workers count (1-64)
fn parse_workers(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n == 0 {
        Err("workers must be at least 1".to_string())
    } else if n > 64 {
        Err("workers cannot exceed 64".to_string())
    } else {
        Ok(n)
    }
}

/// CPTS - Composite Package Trust Score for Composer dependencies
#[derive(Parser, Debug)]
#[command(name = "cpts")]
#[command(
    version,
    about = "Trust scores for Composer dependencies from GitHub history, Packagist adoption and AI-maintenance heuristics",
    after_help = "\
Examples:
  cpts score monolog/monolog            Detailed score breakdown
  cpts score acme/widgets -f json       JSON output for scripting
  cpts check                            Score every package in composer.lock
  cpts check --fail-under 40            Exit code 1 if any package scores below 40
  cpts trust 'symfony/*'                Exempt a vendor from scoring

Set GITHUB_TOKEN (or add it to .env) for 5000 GitHub requests/hour."
)]
pub struct Cli {
    /// Project root containing composer.json / composer.lock
    #[arg(long, global = true, default_value = ".")]
    pub path: PathBuf,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Number of parallel workers (1-64)
    #[arg(long, global = true, default_value = "4", value_parser = parse_workers)]
    pub workers: usize,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score a single package
    Score {
        /// Package name (vendor/package)
        package: String,

        /// Output format: detailed, json, minimal
        #[arg(long, short = 'f', default_value = "detailed", value_parser = ["detailed", "json", "minimal"])]
        format: String,

        /// Bypass the response cache
        #[arg(long)]
        no_cache: bool,
    },

    /// Score every package in composer.lock
    Check {
        /// Output format: table, json
        #[arg(long, short = 'f', default_value = "table", value_parser = ["table", "json"])]
        format: String,

        /// Exit with code 1 if any package scores below this threshold
        #[arg(long)]
        fail_under: Option<u32>,

        /// Bypass the response cache
        #[arg(long)]
        no_cache: bool,

        /// Include packages-dev
        #[arg(long)]
        dev: bool,

        /// Only check this package
        #[arg(long)]
        only: Option<String>,
    },

    /// Add packages or vendor/* patterns to trusted_packages in cpts.toml
    Trust {
        /// Package names or patterns
        #[arg(required = true)]
        packages: Vec<String>,

        /// Remove from the trusted list instead
        #[arg(long, short = 'r')]
        remove: bool,
    },
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Score {
            package,
            format,
            no_cache,
        } => score::run(&cli.path, &package, &format, no_cache, cli.workers),

        Commands::Check {
            format,
            fail_under,
            no_cache,
            dev,
            only,
        } => check::run(
            &cli.path,
            &format,
            fail_under,
            no_cache,
            dev,
            only.as_deref(),
            cli.workers,
        ),

        Commands::Trust { packages, remove } => trust::run(&cli.path, &packages, remove),
    }
}

/// Everything needed to score packages for one project
pub(crate) struct Scoring {
    pub config: CptsConfig,
    pub resolver: PackageResolver,
    pub calculator: ScoreCalculator,
}

impl Scoring {
    pub fn build(project_root: &Path, no_cache: bool) -> Result<Self> {
        let config = load_config(project_root);

        let cache: Arc<dyn Cache> = if no_cache {
            Arc::new(NullCache)
        } else {
            let dir = ensure_cache_dir(&config.cache_dir(project_root))
                .context("Failed to create cache directory")?;
            debug!("Using cache at {}", dir.display());
            Arc::new(FilesystemCache::new(dir))
        };

        let github = GitHubClient::new(cache.clone(), github_token(project_root))
            .with_ttl_override(config.cache_ttl());
        let packagist = PackagistClient::new(cache).with_ttl_override(config.cache_ttl());
        let resolver = PackageResolver::new(Arc::new(github), Arc::new(packagist));

        let registry = MetricRegistry::with_defaults(&config.weights);
        let calculator = ScoreCalculator::new(registry, TrustBonus);

        Ok(Self {
            config,
            resolver,
            calculator,
        })
    }
}

pub(crate) fn project_root(path: &Path) -> Result<PathBuf> {
    path.canonicalize()
        .with_context(|| format!("Path does not exist: {}", path.display()))
}

/// Grade colored the way scores are read: green good, red bad
pub(crate) fn styled_grade(grade: Grade) -> console::StyledObject<&'static str> {
    let s = style(grade.as_str()).bold();
    match grade {
        Grade::A => s.green(),
        Grade::B => s.green().bright(),
        Grade::C => s.yellow(),
        Grade::D => s.red().bright(),
        Grade::F => s.red(),
    }
}

pub(crate) fn styled_level<D>(level: MetricLevel, value: D) -> console::StyledObject<D> {
    let s = style(value);
    match level {
        MetricLevel::Excellent => s.green(),
        MetricLevel::Good => s.green().bright(),
        MetricLevel::Caution => s.yellow(),
        MetricLevel::Warning => s.red().bright(),
        MetricLevel::Fail => s.red(),
    }
}

/// One colored level symbol per registered metric, `·` for skipped ones
pub(crate) fn metric_strip(result: &ScoreResult, registry: &MetricRegistry) -> String {
    registry
        .metrics()
        .iter()
        .map(|entry| match result.metric(entry.name()) {
            Some(m) => styled_level(m.level(), m.level().symbol()).to_string(),
            None => style("·").dim().to_string(),
        })
        .collect()
}

/// Emoji header matching [`metric_strip`]
pub(crate) fn metric_header(registry: &MetricRegistry) -> String {
    registry
        .metrics()
        .iter()
        .map(|entry| entry.metric().emoji())
        .collect::<Vec<_>>()
        .join(" ")
}
