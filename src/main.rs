//! CLI entry point for the COVID trends pipeline.
//!
//! Provides subcommands for normalizing a single provider feed, combining
//! all feeds into one daily table, and exporting the standard chart views.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use covid_trends::chart::{CsvRenderer, chart_views, present};
use covid_trends::config::{DEFAULT_SCOPE, Settings, scope_code};
use covid_trends::fetch::BasicClient;
use covid_trends::output::write_series_file;
use covid_trends::pipeline::Pipeline;
use covid_trends::sources::Provider;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "covid_trends")]
#[command(about = "Normalize and combine COVID-19 case feeds into daily trends", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Combine every provider into one daily table
    Combine {
        /// Sub-region (county) to add alongside the statewide series
        #[arg(short, long, default_value = DEFAULT_SCOPE)]
        scope: String,

        /// Prefix code for the sub-region columns (defaults to the first three letters)
        #[arg(long)]
        scope_code: Option<String>,

        /// CSV file to write
        #[arg(short, long, default_value = "combined.csv")]
        output: PathBuf,

        /// Gzip compress the CSV
        #[arg(long, default_value_t = false)]
        gzip: bool,
    },
    /// Normalize a single provider feed
    Normalize {
        /// Provider to fetch: osdh, nyt or ctp
        #[arg(value_name = "PROVIDER")]
        provider: Provider,

        /// Optional sub-region filter
        #[arg(short, long)]
        scope: Option<String>,

        /// Column prefix (defaults to <provider>_<region code>)
        #[arg(short, long)]
        prefix: Option<String>,

        /// CSV file to write (defaults to <prefix>.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Gzip compress the CSV
        #[arg(long, default_value_t = false)]
        gzip: bool,
    },
    /// Export the standard chart views as CSV plus a JSON manifest
    Chart {
        /// Sub-region (county) to chart alongside the statewide series
        #[arg(short, long, default_value = DEFAULT_SCOPE)]
        scope: String,

        /// Prefix code for the sub-region columns (defaults to the first three letters)
        #[arg(long)]
        scope_code: Option<String>,

        /// Directory to write chart files to
        #[arg(short = 'd', long, default_value = "charts")]
        output_dir: PathBuf,
    },
    /// List configured provider feeds
    Sources,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let _log_guard = init_logging()?;

    let cli = Cli::parse();
    let settings = Settings::from_env();

    match cli.command {
        Commands::Combine {
            scope,
            scope_code: code,
            output,
            gzip,
        } => {
            let mut pipeline = Pipeline::new(BasicClient::new()?, &settings);
            let code = code.unwrap_or_else(|| scope_code(&scope));
            let combined = pipeline
                .combined_with_code(&scope, &code)
                .with_context(|| format!("failed to combine feeds for {scope}"))?;

            write_series_file(&output, &combined, gzip)
                .with_context(|| format!("failed to write {}", output.display()))?;
        }
        Commands::Normalize {
            provider,
            scope,
            prefix,
            output,
            gzip,
        } => {
            let mut pipeline = Pipeline::new(BasicClient::new()?, &settings);
            let prefix = prefix.unwrap_or_else(|| {
                let code = scope.as_deref().map(scope_code).unwrap_or_default();
                pipeline.prefixes(&code).prefix(provider, scope.is_some())
            });
            let series = pipeline
                .normalized(provider, scope.as_deref(), &prefix)
                .with_context(|| format!("failed to normalize {provider}"))?;

            let output = output.unwrap_or_else(|| PathBuf::from(format!("{prefix}.csv")));
            write_series_file(&output, &series, gzip)
                .with_context(|| format!("failed to write {}", output.display()))?;
        }
        Commands::Chart {
            scope,
            scope_code: code,
            output_dir,
        } => {
            let mut pipeline = Pipeline::new(BasicClient::new()?, &settings);
            let code = code.unwrap_or_else(|| scope_code(&scope));
            let combined = pipeline
                .combined_with_code(&scope, &code)
                .with_context(|| format!("failed to combine feeds for {scope}"))?;

            let views = chart_views(&pipeline.prefixes(&code));
            let mut renderer = CsvRenderer::new(&output_dir);
            present(&combined, &views, &mut renderer)
                .with_context(|| format!("failed to export charts to {}", output_dir.display()))?;
        }
        Commands::Sources => {
            let pipeline = Pipeline::new(BasicClient::new()?, &settings);
            for source in pipeline.sources().iter() {
                info!(
                    provider = %source.provider(),
                    description = source.provider().description(),
                    url = source.url(),
                    scope_column = source.scope_column().unwrap_or("-"),
                    "Source"
                );
            }
        }
    }

    Ok(())
}

/// Logging setup: colored stderr + JSON rolling log file.
///
/// The returned guard must be held until exit so buffered file output is
/// flushed.
fn init_logging() -> Result<WorkerGuard> {
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/covid_trends.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("covid_trends.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

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

    Ok(guard)
}
