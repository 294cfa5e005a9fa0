//! Pipeline thresholds and process settings.
//!
//! [`PipelineConfig`] is passed explicitly to the validator, the loader and the
//! analyzers. It can be kept as a JSON object on disk; any omitted key falls
//! back to its default:
//! ```json
//! {
//!   "max_passengers": 8,
//!   "rush_hours": [7, 8, 9, 17, 18, 19],
//!   "histogram_bucket_kmh": 10.0
//! }
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result, bail, ensure};
use serde::Deserialize;

use crate::analyzers::histogram::{MAX_BINS, regular_bins};
use crate::geo::BoundingBox;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub min_passengers: u32,
    pub max_passengers: u32,
    pub min_duration_s: i64,
    pub max_duration_s: i64,
    pub bounding_box: BoundingBox,
    pub max_speed_kmh: f64,
    /// Durations strictly below this are `Short`.
    pub short_below_s: i64,
    /// Durations strictly above this are `Long`.
    pub long_above_s: i64,
    pub rush_hours: Vec<u32>,
    pub histogram_bucket_kmh: f64,
    /// Speeds at or above this collapse into one terminal bucket.
    pub histogram_overflow_kmh: f64,
    pub chunk_size: usize,
    pub anomaly_speed_kmh: f64,
    pub anomaly_distance_km: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_passengers: 1,
            max_passengers: 6,
            min_duration_s: 60,
            max_duration_s: 86_400,
            bounding_box: BoundingBox::NYC,
            max_speed_kmh: 200.0,
            short_below_s: 600,
            long_above_s: 1800,
            rush_hours: vec![7, 8, 9, 16, 17, 18, 19],
            histogram_bucket_kmh: 5.0,
            histogram_overflow_kmh: 100.0,
            chunk_size: 50_000,
            anomaly_speed_kmh: 120.0,
            anomaly_distance_km: 100.0,
        }
    }
}

impl PipelineConfig {
    /// Loads the config from a JSON file at `path` and validates it.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading pipeline config {path}"))?;
        let config: PipelineConfig = serde_json::from_str(&content)
            .with_context(|| format!("parsing pipeline config {path}"))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings that would make the pipeline ill-defined.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.min_passengers <= self.max_passengers,
            "min_passengers ({}) exceeds max_passengers ({})",
            self.min_passengers,
            self.max_passengers
        );
        ensure!(
            0 < self.min_duration_s && self.min_duration_s <= self.max_duration_s,
            "duration bounds must satisfy 0 < min <= max, got [{}, {}]",
            self.min_duration_s,
            self.max_duration_s
        );
        ensure!(
            self.short_below_s <= self.long_above_s,
            "short_below_s ({}) exceeds long_above_s ({})",
            self.short_below_s,
            self.long_above_s
        );
        let b = &self.bounding_box;
        ensure!(
            b.min_lat <= b.max_lat && b.min_lon <= b.max_lon,
            "bounding box is inverted: {b:?}"
        );
        ensure!(self.max_speed_kmh > 0.0, "max_speed_kmh must be positive");
        ensure!(
            self.histogram_bucket_kmh > 0.0 && self.histogram_bucket_kmh.is_finite(),
            "histogram_bucket_kmh must be positive"
        );
        ensure!(
            self.histogram_overflow_kmh > 0.0 && self.histogram_overflow_kmh.is_finite(),
            "histogram_overflow_kmh must be positive"
        );
        ensure!(
            regular_bins(self.histogram_bucket_kmh, self.histogram_overflow_kmh).is_some(),
            "histogram_bucket_kmh ({}) splits histogram_overflow_kmh ({}) into more than {} bins",
            self.histogram_bucket_kmh,
            self.histogram_overflow_kmh,
            MAX_BINS
        );
        ensure!(self.chunk_size > 0, "chunk_size must be at least 1");
        if let Some(hour) = self.rush_hours.iter().find(|h| **h > 23) {
            bail!("rush hour {hour} is outside 0..=23");
        }
        Ok(())
    }

    pub fn is_rush_hour(&self, hour: u32) -> bool {
        self.rush_hours.contains(&hour)
    }
}

/// Process-level settings read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub store_path: PathBuf,
    pub raw_trips_path: PathBuf,
    pub pipeline_config_path: Option<String>,
    pub log_file_path: String,
}

impl AppSettings {
    pub fn from_env() -> Self {
        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "csv:///data/db/trips.csv".to_string());
        Self {
            store_path: store_path_from_url(&database_url),
            raw_trips_path: std::env::var("RAW_TRIPS_PATH")
                .unwrap_or_else(|_| "data/raw/train.csv".to_string())
                .into(),
            pipeline_config_path: std::env::var("PIPELINE_CONFIG").ok(),
            log_file_path: std::env::var("LOG_FILE_PATH")
                .unwrap_or_else(|_| "logs/taxi_trip_analytics.log".to_string()),
        }
    }

    /// Explicit config file if one is set, otherwise the defaults.
    pub fn pipeline_config(&self) -> Result<PipelineConfig> {
        match &self.pipeline_config_path {
            Some(path) => PipelineConfig::load(path),
            None => Ok(PipelineConfig::default()),
        }
    }
}

/// `csv:///data/db/trips.csv` and `data/db/trips.csv` both name a relative path.
fn store_path_from_url(url: &str) -> PathBuf {
    url.strip_prefix("csv:///").unwrap_or(url).into()
}
