use tracing::debug;

use crate::analyzers::aggregate::summarize;
use crate::analyzers::distribution::duration_mix;
use crate::analyzers::filter::{FilterCriteria, matches};
use crate::analyzers::histogram::{BucketLayout, speed_histogram};
use crate::analyzers::ranking::busiest_hours;
use crate::analyzers::types::{BusiestHours, DurationMix, SpeedHistogram, Summary};
use crate::config::PipelineConfig;
use crate::record::TripRecord;

/// Runs the aggregations over a read-only snapshot of stored trips.
///
/// Holds no state besides the configuration, so one analyzer can serve any
/// number of concurrent queries.
#[derive(Debug, Clone, Copy)]
pub struct TripAnalyzer<'a> {
    config: &'a PipelineConfig,
}

impl<'a> TripAnalyzer<'a> {
    pub fn new(config: &'a PipelineConfig) -> Self {
        Self { config }
    }

    /// The records every aggregation sees.
    pub fn filtered<'r>(
        &self,
        records: &'r [TripRecord],
        criteria: &'r FilterCriteria,
    ) -> impl Iterator<Item = &'r TripRecord> + 'r
    where
        'a: 'r,
    {
        let config = self.config;
        records.iter().filter(move |r| matches(r, criteria, config))
    }

    pub fn summary(&self, records: &[TripRecord], criteria: &FilterCriteria) -> Summary {
        let summary = summarize(self.filtered(records, criteria));
        debug!(trips = summary.trips, "Summary computed");
        summary
    }

    pub fn busiest_hours(
        &self,
        records: &[TripRecord],
        criteria: &FilterCriteria,
        k: usize,
    ) -> BusiestHours {
        busiest_hours(self.filtered(records, criteria), k)
    }

    /// `bucket_kmh` overrides the configured bin width when set.
    pub fn speed_histogram(
        &self,
        records: &[TripRecord],
        criteria: &FilterCriteria,
        bucket_kmh: Option<f64>,
    ) -> SpeedHistogram {
        let layout = BucketLayout::new(
            bucket_kmh.unwrap_or(self.config.histogram_bucket_kmh),
            self.config.histogram_overflow_kmh,
        );
        speed_histogram(self.filtered(records, criteria), &layout)
    }

    pub fn duration_mix(&self, records: &[TripRecord], criteria: &FilterCriteria) -> DurationMix {
        duration_mix(self.filtered(records, criteria))
    }
}
