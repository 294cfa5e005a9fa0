//! Durable storage for trip records.
//!
//! A load never edits the store in place: [`TripStore::begin_refresh`] stages a
//! complete replacement and [`RefreshWriter::commit`] swaps it in. Dropping an
//! uncommitted writer leaves the previous contents untouched.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use anyhow::{Context, Result, anyhow};
use csv::WriterBuilder;
use tracing::{debug, info, warn};

use crate::record::TripRecord;

pub trait TripStore {
    /// Starts a full-refresh write.
    fn begin_refresh(&self) -> Result<Box<dyn RefreshWriter + '_>>;

    /// Reads a snapshot of every stored record. An empty or missing store is
    /// an empty snapshot, not an error.
    fn scan(&self) -> Result<Vec<TripRecord>>;

    fn exists(&self) -> bool;
}

/// Staged replacement of a store's contents.
pub trait RefreshWriter {
    /// Buffers one chunk of accepted records.
    fn write_chunk(&mut self, records: &[TripRecord]) -> Result<()>;

    /// Makes the staged records the store's contents.
    fn commit(self: Box<Self>) -> Result<()>;
}

/// Records kept as a CSV file, replaced by rename on commit.
#[derive(Debug, Clone)]
pub struct CsvTripStore {
    path: PathBuf,
}

impl CsvTripStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "trips.csv".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl TripStore for CsvTripStore {
    fn begin_refresh(&self) -> Result<Box<dyn RefreshWriter + '_>> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating store directory {}", dir.display()))?;
        }

        let staging = self.staging_path();
        let file = File::create(&staging)
            .with_context(|| format!("creating staging file {}", staging.display()))?;
        debug!(staging = %staging.display(), "Store refresh started");

        Ok(Box::new(CsvRefresh {
            writer: Some(WriterBuilder::new().has_headers(true).from_writer(file)),
            staging,
            target: &self.path,
            written: 0,
        }))
    }

    fn scan(&self) -> Result<Vec<TripRecord>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "Store file missing, empty snapshot");
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)
            .with_context(|| format!("opening store {}", self.path.display()))?;
        let mut rdr = csv::Reader::from_reader(file);
        let mut records = Vec::new();

        for result in rdr.deserialize() {
            let record: TripRecord =
                result.with_context(|| format!("reading store {}", self.path.display()))?;
            records.push(record);
        }

        Ok(records)
    }

    fn exists(&self) -> bool {
        self.path.exists()
    }
}

struct CsvRefresh<'a> {
    // `None` once committed.
    writer: Option<csv::Writer<File>>,
    staging: PathBuf,
    target: &'a Path,
    written: usize,
}

impl RefreshWriter for CsvRefresh<'_> {
    fn write_chunk(&mut self, records: &[TripRecord]) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| anyhow!("store refresh already committed"))?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        self.written += records.len();
        Ok(())
    }

    fn commit(mut self: Box<Self>) -> Result<()> {
        let writer = self
            .writer
            .take()
            .ok_or_else(|| anyhow!("store refresh already committed"))?;
        let file = writer
            .into_inner()
            .map_err(|e| anyhow!("flushing staged records: {}", e.error()))?;
        file.sync_all()?;
        drop(file);

        fs::rename(&self.staging, self.target).with_context(|| {
            format!(
                "replacing {} with {}",
                self.target.display(),
                self.staging.display()
            )
        })?;
        info!(path = %self.target.display(), records = self.written, "Store replaced");
        Ok(())
    }
}

impl Drop for CsvRefresh<'_> {
    fn drop(&mut self) {
        if self.writer.take().is_some() {
            if let Err(e) = fs::remove_file(&self.staging) {
                warn!(staging = %self.staging.display(), error = %e, "Failed to discard staged records");
            } else {
                debug!(staging = %self.staging.display(), "Uncommitted refresh discarded");
            }
        }
    }
}

/// In-process store, mostly for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryTripStore {
    records: RwLock<Option<Vec<TripRecord>>>,
}

impl MemoryTripStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TripStore for MemoryTripStore {
    fn begin_refresh(&self) -> Result<Box<dyn RefreshWriter + '_>> {
        Ok(Box::new(MemoryRefresh {
            store: self,
            staged: Vec::new(),
        }))
    }

    fn scan(&self) -> Result<Vec<TripRecord>> {
        let guard = self
            .records
            .read()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        Ok(guard.clone().unwrap_or_default())
    }

    fn exists(&self) -> bool {
        self.records.read().map(|g| g.is_some()).unwrap_or(false)
    }
}

struct MemoryRefresh<'a> {
    store: &'a MemoryTripStore,
    staged: Vec<TripRecord>,
}

impl RefreshWriter for MemoryRefresh<'_> {
    fn write_chunk(&mut self, records: &[TripRecord]) -> Result<()> {
        self.staged.extend_from_slice(records);
        Ok(())
    }

    fn commit(self: Box<Self>) -> Result<()> {
        let MemoryRefresh { store, staged } = *self;
        let mut guard = store
            .records
            .write()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        *guard = Some(staged);
        Ok(())
    }
}
