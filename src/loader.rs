//! Batch load: raw CSV rows in, cleaned trip records out to a [`TripStore`].
//!
//! Rows are read lazily and processed in fixed-size chunks so memory stays
//! bounded regardless of the source size. Chunk boundaries do not affect the
//! result. The store is only replaced once every chunk has been written.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::record::{RawRow, TripRecord};
use crate::stats::{LoadReport, RejectionTally};
use crate::store::{RefreshWriter, TripStore};
use crate::validate::{RejectReason, validate_and_enrich};

/// Opens the raw trip CSV at `path`, decompressing `.gz` files on the fly.
///
/// Each call starts from the first row, so a failed load can simply be rerun.
pub fn open_source(path: &Path) -> Result<csv::Reader<Box<dyn Read>>> {
    let file =
        File::open(path).with_context(|| format!("opening raw trips {}", path.display()))?;
    let reader: Box<dyn Read> = if path.extension().and_then(|e| e.to_str()) == Some("gz") {
        Box::new(GzDecoder::new(BufReader::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };

    Ok(csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader))
}

/// Loads the CSV at `path` into `store`, replacing its contents.
pub fn load_from_path(
    path: &Path,
    store: &dyn TripStore,
    config: &PipelineConfig,
) -> Result<LoadReport> {
    let mut rdr = open_source(path)?;
    load(rdr.deserialize::<RawRow>(), store, config)
}

/// Runs every row through validation, writes accepted records chunk by chunk
/// and commits the store once the source is exhausted.
///
/// Rows the CSV reader cannot decode count as `MalformedField`. Only I/O
/// failures abort the load, in which case the store keeps its prior contents.
#[tracing::instrument(skip_all, fields(chunk_size = config.chunk_size))]
pub fn load<I>(rows: I, store: &dyn TripStore, config: &PipelineConfig) -> Result<LoadReport>
where
    I: IntoIterator<Item = csv::Result<RawRow>>,
{
    let mut refresh = store.begin_refresh()?;
    let mut seen_ids = HashSet::new();
    let mut report = LoadReport::default();
    let mut chunk = Vec::with_capacity(config.chunk_size);

    for item in rows {
        let row = match item {
            Ok(row) => Ok(row),
            Err(e) if e.is_io_error() => {
                return Err(e).context("reading raw trip source");
            }
            Err(e) => {
                debug!(error = %e, "Undecodable raw row");
                Err(RejectReason::MalformedField)
            }
        };
        chunk.push(row);

        if chunk.len() == config.chunk_size {
            process_chunk(&chunk, report.chunks, refresh.as_mut(), &mut seen_ids, config, &mut report)?;
            chunk.clear();
        }
    }
    if !chunk.is_empty() {
        process_chunk(&chunk, report.chunks, refresh.as_mut(), &mut seen_ids, config, &mut report)?;
    }

    refresh.commit()?;

    info!(
        rows_read = report.rows_read,
        accepted = report.accepted,
        rejected = report.rejected.total(),
        rejected_pct = report.rejected_pct(),
        suspicious = report.suspicious,
        chunks = report.chunks,
        "Batch load complete"
    );
    Ok(report)
}

#[tracing::instrument(skip_all, fields(chunk = index, rows = rows.len()))]
fn process_chunk(
    rows: &[Result<RawRow, RejectReason>],
    index: usize,
    refresh: &mut (dyn RefreshWriter + '_),
    seen_ids: &mut HashSet<String>,
    config: &PipelineConfig,
    report: &mut LoadReport,
) -> Result<()> {
    let mut accepted: Vec<TripRecord> = Vec::with_capacity(rows.len());
    let mut rejected = RejectionTally::default();
    let mut suspicious = 0usize;

    for row in rows {
        let outcome = row
            .as_ref()
            .map_err(|reason| *reason)
            .and_then(|raw| validate_and_enrich(raw, config))
            .and_then(|record| {
                if seen_ids.insert(record.id.clone()) {
                    Ok(record)
                } else {
                    Err(RejectReason::DuplicateId)
                }
            });

        match outcome {
            Ok(record) => {
                if record.trip_speed_kmh > config.anomaly_speed_kmh
                    || record.trip_distance_km > config.anomaly_distance_km
                {
                    suspicious += 1;
                }
                accepted.push(record);
            }
            Err(reason) => rejected.record(reason),
        }
    }

    if suspicious > 0 {
        warn!(
            suspicious,
            speed_kmh = config.anomaly_speed_kmh,
            distance_km = config.anomaly_distance_km,
            "Accepted rows above anomaly thresholds"
        );
    }
    debug!(
        accepted = accepted.len(),
        rejected = rejected.total(),
        "Chunk validated"
    );

    refresh
        .write_chunk(&accepted)
        .with_context(|| format!("writing chunk {index}"))?;

    report.rows_read += rows.len();
    report.accepted += accepted.len();
    report.suspicious += suspicious;
    report.rejected.merge(&rejected);
    report.chunks += 1;
    Ok(())
}
