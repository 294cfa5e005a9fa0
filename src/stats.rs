use serde::Serialize;

use crate::validate::RejectReason;

/// One counter per [`RejectReason`].
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RejectionTally {
    pub missing_field: usize,
    pub malformed_field: usize,
    pub malformed_timestamp: usize,
    pub inverted_timestamps: usize,
    pub non_positive_duration: usize,
    pub duration_out_of_range: usize,
    pub passenger_count_out_of_range: usize,
    pub coordinate_out_of_bounds: usize,
    pub implausible_speed: usize,
    pub duplicate_id: usize,
}

impl RejectionTally {
    fn slot(&mut self, reason: RejectReason) -> &mut usize {
        match reason {
            RejectReason::MissingField => &mut self.missing_field,
            RejectReason::MalformedField => &mut self.malformed_field,
            RejectReason::MalformedTimestamp => &mut self.malformed_timestamp,
            RejectReason::InvertedTimestamps => &mut self.inverted_timestamps,
            RejectReason::NonPositiveDuration => &mut self.non_positive_duration,
            RejectReason::DurationOutOfRange => &mut self.duration_out_of_range,
            RejectReason::PassengerCountOutOfRange => &mut self.passenger_count_out_of_range,
            RejectReason::CoordinateOutOfBounds => &mut self.coordinate_out_of_bounds,
            RejectReason::ImplausibleSpeed => &mut self.implausible_speed,
            RejectReason::DuplicateId => &mut self.duplicate_id,
        }
    }

    pub fn record(&mut self, reason: RejectReason) {
        *self.slot(reason) += 1;
    }

    pub fn count(&self, reason: RejectReason) -> usize {
        match reason {
            RejectReason::MissingField => self.missing_field,
            RejectReason::MalformedField => self.malformed_field,
            RejectReason::MalformedTimestamp => self.malformed_timestamp,
            RejectReason::InvertedTimestamps => self.inverted_timestamps,
            RejectReason::NonPositiveDuration => self.non_positive_duration,
            RejectReason::DurationOutOfRange => self.duration_out_of_range,
            RejectReason::PassengerCountOutOfRange => self.passenger_count_out_of_range,
            RejectReason::CoordinateOutOfBounds => self.coordinate_out_of_bounds,
            RejectReason::ImplausibleSpeed => self.implausible_speed,
            RejectReason::DuplicateId => self.duplicate_id,
        }
    }

    pub fn total(&self) -> usize {
        RejectReason::ALL.iter().map(|r| self.count(*r)).sum()
    }

    /// Adds every counter of `other` into `self`.
    pub fn merge(&mut self, other: &RejectionTally) {
        for reason in RejectReason::ALL {
            *self.slot(reason) += other.count(reason);
        }
    }
}

/// Outcome of a batch load, reported once all chunks are written.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct LoadReport {
    pub rows_read: usize,
    pub accepted: usize,
    pub rejected: RejectionTally,
    /// Accepted rows above the anomaly speed or distance thresholds.
    pub suspicious: usize,
    pub chunks: usize,
}

impl LoadReport {
    pub fn pct(part: usize, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            (part as f64 / total as f64) * 100.0
        }
    }

    pub fn rejected_pct(&self) -> f64 {
        Self::pct(self.rejected.total(), self.rows_read)
    }
}
