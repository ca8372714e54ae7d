//! Command-line front end: load a snapshot, run the chart transform, and
//! print the result as JSON.
//!
//! Run with: cargo run --bin chartseries -- series --file oi.csv --zscore 90

use anyhow::{Context, Result};
use chartseries::backtest::{
    panel, parse_backtest_with_report, parse_metrics, position_counts, positions,
};
use chartseries::settings::DashboardConfig;
use chartseries::source::{load_frame, DataSource, DirSource};
use chartseries::transform::{EvictionPolicy, RecencyFilter, TransformParams};
use chartseries::view::ChartView;
use chrono::Utc;
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "chartseries")]
#[command(about = "Chart-ready statistics for dashboard snapshots")]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the data directory from the configuration
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Transform one metric of a CSV or JSON snapshot
    Series {
        /// Snapshot path relative to the data directory
        #[arg(short, long)]
        file: String,

        /// Metric to chart (defaults to the first column)
        #[arg(short, long)]
        metric: Option<String>,

        /// Trailing z-score window
        #[arg(long)]
        zscore: Option<usize>,

        /// Moving-average period
        #[arg(long)]
        ma: Option<usize>,

        /// Lookback: M, Q, YTD, Y, 2Y or AT
        #[arg(short, long)]
        recency: Option<RecencyFilter>,

        /// Gap handling: count or positional
        #[arg(long)]
        eviction: Option<EvictionPolicy>,
    },
    /// Summarize a backtest result file and its metrics file
    Backtest {
        /// Per-date results CSV relative to the data directory
        #[arg(short, long)]
        file: String,

        /// Metric/Value CSV relative to the data directory
        #[arg(long)]
        metrics: Option<String>,

        /// Assets to read (defaults to every asset in the file)
        #[arg(short, long, value_delimiter = ',')]
        assets: Vec<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let mut config = DashboardConfig::load(cli.config.as_deref())
        .context("failed to load configuration")?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    info!(data_dir = %config.data_dir.display(), "configuration loaded");

    let source = DirSource::new(&config.data_dir);

    let output = match cli.command {
        Commands::Series {
            file,
            metric,
            zscore,
            ma,
            recency,
            eviction,
        } => {
            let defaults = config.transform;
            let params = TransformParams {
                z_score_window: zscore.or(defaults.z_score_window),
                moving_average_period: ma.or(defaults.moving_average_period),
                recency: recency.unwrap_or(defaults.recency),
                eviction: eviction.unwrap_or(defaults.eviction),
            };

            let ingested = load_frame(&source, &file, &config.schema)
                .with_context(|| format!("failed to load {file}"))?;
            let metric = match metric {
                Some(m) => m,
                None => ingested
                    .frame
                    .labels()
                    .first()
                    .cloned()
                    .context("snapshot has no metric columns")?,
            };

            let mut view = ChartView::new(ingested.frame, &metric, params)?;
            let out = view.refresh(Utc::now()).clone();
            json!({
                "metric": metric,
                "params": params,
                "extent": view.extent(),
                "skipped_rows": ingested.report.issues.len(),
                "output": out,
            })
        }
        Commands::Backtest {
            file,
            metrics,
            assets,
        } => {
            let assets = if assets.is_empty() {
                config.backtest.assets.clone()
            } else {
                assets
            };

            let bytes = source.read(&file)?;
            let (records, report) = parse_backtest_with_report(bytes.as_slice(), &assets)
                .with_context(|| format!("failed to parse {file}"))?;

            let panel_items = match metrics {
                Some(path) => {
                    let bytes = source.read(&path)?;
                    let rows = parse_metrics(bytes.as_slice())
                        .with_context(|| format!("failed to parse {path}"))?;
                    panel(&rows, &config.backtest.benchmark_asset)
                }
                None => Vec::new(),
            };

            json!({
                "rows": records.len(),
                "skipped_rows": report.issues.len(),
                "position_counts": position_counts(&records),
                "positions": positions(&records),
                "panel": panel_items,
            })
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
