mod input;
mod model;
mod pipeline;
mod report;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::input::{DataPaths, SnapshotStore, discover_years, scorecard};
use crate::model::degree::DegreeLevel;
use crate::model::metrics::{MetricSelection, Profile};
use crate::pipeline::{PipelineError, RankParams};
use crate::report::ReportFormat;

#[derive(Parser)]
#[command(
    name = "mobility-rank",
    version,
    about = "Rank colleges by economic-mobility indicators and compare against published rankings"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rank institutions for one year and compare against the reference ranking.
    Rank(RankArgs),
    /// Build or refresh the on-disk cache for every year found in the data directory.
    Warm(WarmArgs),
    /// List the metric columns available in a profile.
    Metrics {
        #[arg(long, value_enum, default_value_t)]
        profile: Profile,
    },
}

#[derive(Args)]
struct RankArgs {
    /// Directory containing the per-year scorecard extracts.
    #[arg(long, value_name = "DIR")]
    data_dir: PathBuf,
    /// Reference-ranking CSV (UNITID plus one column per year).
    #[arg(long, value_name = "FILE")]
    reference: PathBuf,
    /// Directory for cached stripped tables.
    #[arg(long, value_name = "DIR", default_value = "cache")]
    cache_dir: PathBuf,
    /// Parse the source extracts directly, bypassing the cache.
    #[arg(long)]
    no_cache: bool,
    #[arg(long, value_enum, default_value_t)]
    profile: Profile,

    /// Year to rank.
    #[arg(long)]
    year: u16,
    /// Metric selection: COLUMN or COLUMN=WEIGHT. Repeat for multi-metric mode.
    #[arg(long = "metric", value_name = "COLUMN[=WEIGHT]", required = true)]
    metrics: Vec<String>,
    /// Drop institutions whose highest degree is below this level.
    #[arg(long, value_enum, default_value_t = DegreeLevel::NonDegree)]
    min_degree: DegreeLevel,
    /// Show only the top N institutions (0 = all). Display only; ranks are
    /// assigned before truncation.
    #[arg(long, default_value_t = 0)]
    top: usize,
    /// Hide institutions absent from the reference ranking. Survivors are
    /// re-ranked densely; the score ordering is unchanged.
    #[arg(long)]
    hide_outsiders: bool,

    #[arg(long, value_enum, default_value_t)]
    format: ReportFormat,
    /// Write the report here instead of stdout.
    #[arg(long, value_name = "FILE")]
    out: Option<PathBuf>,
}

#[derive(Args)]
struct WarmArgs {
    /// Directory containing the per-year scorecard extracts.
    #[arg(long, value_name = "DIR")]
    data_dir: PathBuf,
    /// Directory for cached stripped tables.
    #[arg(long, value_name = "DIR", default_value = "cache")]
    cache_dir: PathBuf,
    #[arg(long, value_enum, default_value_t)]
    profile: Profile,
}

fn main() {
    init_tracing();
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Rank(args) => cmd_rank(args),
        Command::Warm(args) => cmd_warm(args),
        Command::Metrics { profile } => cmd_metrics(profile),
    }
}

fn cmd_rank(args: RankArgs) -> Result<()> {
    let registry = args.profile.registry();
    tracing::info!(
        year = args.year,
        min_degree = args.min_degree.label(),
        top = args.top,
        hide_outsiders = args.hide_outsiders,
        "ranking request"
    );

    let available = discover_years(&args.data_dir)
        .with_context(|| format!("scanning {}", args.data_dir.display()))?;
    if !available.contains(&args.year) {
        return Err(PipelineError::YearNotLoaded {
            year: args.year,
            available: describe_years(&available),
        }
        .into());
    }

    let paths = DataPaths {
        data_dir: args.data_dir,
        reference_path: args.reference,
        cache_dir: args.cache_dir,
        use_cache: !args.no_cache,
    };
    let store =
        SnapshotStore::load(&paths, &registry, &[args.year]).context("loading year data")?;
    let snapshot = store
        .snapshot(args.year)
        .ok_or_else(|| PipelineError::YearNotLoaded {
            year: args.year,
            available: describe_years(&store.years()),
        })?;

    let params = RankParams {
        selection: parse_selection(&args.metrics)?,
        min_degree: args.min_degree,
        top_n: args.top,
        hide_outsiders: args.hide_outsiders,
    };
    let output = pipeline::run_ranking(snapshot, &registry, &params)?;
    if output.rows.is_empty() {
        tracing::info!(year = args.year, "no institutions matched the filters");
    }

    let rendered = report::render(&output, args.format)?;
    match &args.out {
        Some(path) => fs::write(path, rendered)
            .with_context(|| format!("writing report to {}", path.display()))?,
        None => print!("{rendered}"),
    }
    Ok(())
}

fn cmd_warm(args: WarmArgs) -> Result<()> {
    let registry = args.profile.registry();
    let years = discover_years(&args.data_dir)
        .with_context(|| format!("scanning {}", args.data_dir.display()))?;
    if years.is_empty() {
        bail!(
            "no scorecard extracts found in {}",
            args.data_dir.display()
        );
    }
    for &year in &years {
        let table =
            scorecard::load_year_table(&args.data_dir, &args.cache_dir, true, year, &registry)
                .with_context(|| format!("caching year {year}"))?;
        tracing::info!(year, institutions = table.len(), "cache ready");
    }
    Ok(())
}

fn cmd_metrics(profile: Profile) -> Result<()> {
    let registry = profile.registry();
    for spec in registry.specs() {
        let direction = if spec.lower_is_better {
            "lower is better"
        } else {
            "higher is better"
        };
        println!("{:<16} {:<17} {}", spec.column, direction, spec.label);
    }
    Ok(())
}

/// One bare `--metric COLUMN` is single-metric mode; anything else resolves
/// to a weighted selection, with omitted weights defaulting to 1.
fn parse_selection(specs: &[String]) -> Result<MetricSelection> {
    if specs.len() == 1 && !specs[0].contains('=') {
        return Ok(MetricSelection::Single(specs[0].trim().to_string()));
    }
    let mut weights = Vec::with_capacity(specs.len());
    for spec in specs {
        match spec.split_once('=') {
            Some((column, weight)) => {
                let weight: f64 = weight
                    .trim()
                    .parse()
                    .with_context(|| format!("bad weight in --metric {spec}"))?;
                weights.push((column.trim().to_string(), weight));
            }
            None => weights.push((spec.trim().to_string(), 1.0)),
        }
    }
    Ok(MetricSelection::Weighted(weights))
}

fn describe_years(years: &[u16]) -> String {
    if years.is_empty() {
        return "none".to_string();
    }
    years
        .iter()
        .map(|y| y.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
