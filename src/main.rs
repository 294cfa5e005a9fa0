//! CLI entry point for the taxi trip analytics pipeline.
//!
//! `load` cleans a raw trip CSV into the record store; the query subcommands
//! filter the stored trips and print an aggregate as JSON.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use taxi_trip_analytics::{
    analyzers::TripAnalyzer,
    config::{AppSettings, PipelineConfig},
    loader::load_from_path,
    output::{Health, print_json, print_pretty},
    query::{FilterParams, parse_bucket_width, parse_top_n},
    store::{CsvTripStore, TripStore},
};
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "taxi_trip_analytics")]
#[command(about = "Clean NYC taxi trip records and query trip statistics", long_about = None)]
struct Cli {
    /// Record store file (overrides DATABASE_URL)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// JSON pipeline config (overrides PIPELINE_CONFIG)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean a raw trip CSV (optionally .gz) and replace the record store
    Load {
        /// Raw trips file (overrides RAW_TRIPS_PATH)
        #[arg(value_name = "FILE")]
        source: Option<PathBuf>,
    },
    /// Trip count and average duration, distance and speed
    Summary {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Pickup hours ranked by number of trips
    BusiestHours {
        #[command(flatten)]
        filter: FilterArgs,

        /// Number of hours to report
        #[arg(short, long, default_value_t = 5)]
        k: usize,
    },
    /// Trips per duration category
    Distribution {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Histogram of trip speeds
    SpeedsHist {
        #[command(flatten)]
        filter: FilterArgs,

        /// Bin width in km/h (defaults to the configured width)
        #[arg(long)]
        bin_size: Option<String>,
    },
    /// Report the record store location and size
    Health,
}

#[derive(Args, Debug)]
struct FilterArgs {
    /// Earliest pickup, YYYY-MM-DD or YYYY-MM-DD HH:MM:SS (inclusive)
    #[arg(long)]
    start: Option<String>,

    /// Latest pickup, YYYY-MM-DD or YYYY-MM-DD HH:MM:SS (inclusive)
    #[arg(long)]
    end: Option<String>,

    /// Only rush-hour pickups (1) or only the others (0)
    #[arg(long)]
    rush: Option<String>,

    #[arg(long)]
    min_passengers: Option<String>,

    #[arg(long)]
    max_passengers: Option<String>,
}

impl From<FilterArgs> for FilterParams {
    fn from(args: FilterArgs) -> Self {
        FilterParams {
            start: args.start,
            end: args.end,
            rush: args.rush,
            min_passengers: args.min_passengers,
            max_passengers: args.max_passengers,
        }
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let settings = AppSettings::from_env();

    // Logging setup: colored stderr + JSON rolling log file
    let log_dir = Path::new(&settings.log_file_path)
        .parent()
        .filter(|d| !d.as_os_str().is_empty())
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&settings.log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("taxi_trip_analytics.log"));

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

    let config = match &cli.config {
        Some(path) => PipelineConfig::load(path)?,
        None => settings.pipeline_config()?,
    };

    let store = CsvTripStore::new(cli.store.clone().unwrap_or_else(|| settings.store_path.clone()));

    if let Err(e) = run(cli.command, &settings, &config, &store) {
        error!(error = %e, "Command failed");
        return Err(e);
    }
    Ok(())
}

fn run(
    command: Commands,
    settings: &AppSettings,
    config: &PipelineConfig,
    store: &CsvTripStore,
) -> Result<()> {
    let analyzer = TripAnalyzer::new(config);

    match command {
        Commands::Load { source } => {
            let source = source.unwrap_or_else(|| settings.raw_trips_path.clone());
            info!(source = %source.display(), store = %store.path().display(), "Starting batch load");

            let report = load_from_path(&source, store, config)
                .with_context(|| format!("loading {}", source.display()))?;
            print_pretty(&report);
            print_json(&report)?;
        }
        Commands::Summary { filter } => {
            let criteria = FilterParams::from(filter).parse()?;
            let records = store.scan()?;
            print_json(&analyzer.summary(&records, &criteria))?;
        }
        Commands::BusiestHours { filter, k } => {
            let criteria = FilterParams::from(filter).parse()?;
            let k = parse_top_n(k)?;
            let records = store.scan()?;
            print_json(&analyzer.busiest_hours(&records, &criteria, k))?;
        }
        Commands::Distribution { filter } => {
            let criteria = FilterParams::from(filter).parse()?;
            let records = store.scan()?;
            print_json(&analyzer.duration_mix(&records, &criteria))?;
        }
        Commands::SpeedsHist { filter, bin_size } => {
            let criteria = FilterParams::from(filter).parse()?;
            let bin_size = parse_bucket_width(bin_size.as_deref(), config.histogram_overflow_kmh)?;
            let records = store.scan()?;
            print_json(&analyzer.speed_histogram(&records, &criteria, bin_size))?;
        }
        Commands::Health => {
            let records = store.scan()?.len();
            print_json(&Health {
                status: "ok",
                store_path: store.path().display().to_string(),
                store_exists: store.exists(),
                records,
            })?;
        }
    }

    Ok(())
}
