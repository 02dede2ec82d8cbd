//! CLI entry point for the navigation-latency static API builder.
//!
//! Reads per-day `userRecord.NAVIGATION.csv` exports and materializes a
//! static JSON tree (summaries, county breakdowns, day trends) suitable for
//! serving from any static file host.

use anyhow::Result;
use clap::{Parser, Subcommand};
use nav_api_builder::builder::{TOP_N_PER_COUNTY, build};
use std::ffi::OsStr;
use std::path::Path;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "nav_api_builder")]
#[command(about = "Builds a static JSON API from navigation latency CSV exports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild the full JSON output tree from the data directory
    Build {
        /// Directory containing the per-day navigation CSV exports
        #[arg(short, long, default_value = "data")]
        data_dir: String,

        /// Root directory for the generated JSON tree
        #[arg(short, long, default_value = "docs/api")]
        out_dir: String,

        /// Cap on per-county record listings at every scope
        #[arg(long, default_value_t = TOP_N_PER_COUNTY)]
        top_n: usize,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/nav_api_builder.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("nav_api_builder.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            data_dir,
            out_dir,
            top_n,
        } => {
            let report = build(Path::new(&data_dir), Path::new(&out_dir), top_n)?;
            info!(
                files = report.files,
                records = report.records,
                days = report.days.len(),
                out_dir,
                "Static API build complete"
            );
        }
    }

    Ok(())
}
