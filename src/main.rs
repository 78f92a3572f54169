//! CLI entry point for the bike rental rollup tool.
//!
//! Provides subcommands for inspecting dataset bounds, printing headline
//! metrics, and computing every rollup table for a date range.

use anyhow::{Result, bail};
use bike_rollup::config::RollupConfig;
use bike_rollup::output::{DirectorySink, TableSink, print_pretty, render_json};
use bike_rollup::pipeline::{PipelineContext, Rollups};
use bike_rollup::store::load_paths;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "bike_rollup")]
#[command(about = "Derive rollup tables from bike sharing datasets", long_about = None)]
struct Cli {
    /// JSON config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Daily dataset CSV (overrides config)
    #[arg(long, global = true, value_name = "CSV")]
    day: Option<PathBuf>,

    /// Hourly dataset CSV (overrides config)
    #[arg(long, global = true, value_name = "CSV")]
    hour: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the first and last date of each dataset
    Bounds,
    /// Print headline rental totals for a date range
    Summary {
        /// First day of the range (defaults to the first day in the data)
        #[arg(short, long)]
        start: Option<NaiveDate>,

        /// Last day of the range, inclusive (defaults to the last day in the data)
        #[arg(short, long)]
        end: Option<NaiveDate>,
    },
    /// Compute every rollup table for a date range
    Rollup {
        #[arg(short, long)]
        start: Option<NaiveDate>,

        #[arg(short, long)]
        end: Option<NaiveDate>,

        /// Directory to write table CSVs to (overrides config)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Gzip compress table CSVs
        #[arg(long, default_value_t = false)]
        gzip: bool,

        /// Print all tables as JSON to stdout instead of writing files
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Run the aggregators on parallel workers
        #[arg(long, default_value_t = false)]
        concurrent: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/bike_rollup.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("bike_rollup.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let mut config = RollupConfig::load_or_default(cli.config.as_deref())?;
    if let Some(day) = cli.day {
        config.daily_csv = day;
    }
    if let Some(hour) = cli.hour {
        config.hourly_csv = hour;
    }

    let (daily, hourly) = load_paths(&config.daily_csv, &config.hourly_csv)?;
    let ctx = PipelineContext::new(daily, hourly).with_settings(config.settings());

    match cli.command {
        Commands::Bounds => {
            report_bounds("daily", ctx.daily().bounds());
            report_bounds("hourly", ctx.hourly().bounds());
        }
        Commands::Summary { start, end } => {
            let (start, end) = resolve_range(&ctx, start, end)?;
            let rollups = ctx.rollups(start, end)?;
            println!("{}", serde_json::to_string_pretty(&rollups.summary)?);
        }
        Commands::Rollup {
            start,
            end,
            output_dir,
            gzip,
            json,
            concurrent,
        } => {
            let (start, end) = resolve_range(&ctx, start, end)?;
            let rollups: Rollups = if concurrent {
                ctx.rollups_concurrent(start, end).await?
            } else {
                ctx.rollups(start, end)?
            };
            print_pretty(&rollups);

            if json {
                println!("{}", render_json(&rollups)?);
            } else {
                let dir = output_dir.unwrap_or(config.output_dir);
                let sink = DirectorySink::new(dir, gzip || config.gzip);
                sink.publish(&rollups).await?;
            }
        }
    }

    Ok(())
}

fn report_bounds(dataset: &str, bounds: Option<(NaiveDate, NaiveDate)>) {
    match bounds {
        Some((first, last)) => info!(dataset, %first, %last, "Dataset bounds"),
        None => warn!(dataset, "Dataset is empty"),
    }
}

/// Fills an omitted start or end from the daily store's bounds.
fn resolve_range(
    ctx: &PipelineContext,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<(NaiveDate, NaiveDate)> {
    let Some(full) = ctx.default_range() else {
        bail!("Daily dataset is empty; no date range to analyze");
    };
    Ok((
        start.unwrap_or(full.start()),
        end.unwrap_or(full.end()),
    ))
}
