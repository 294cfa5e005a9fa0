use chrono::NaiveDateTime;

use crate::config::PipelineConfig;
use crate::record::TripRecord;

/// Query-time selection over stored trips. `None` leaves a dimension open.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Inclusive lower bound on pickup time.
    pub start: Option<NaiveDateTime>,
    /// Inclusive upper bound on pickup time.
    pub end: Option<NaiveDateTime>,
    /// `true` keeps only rush-hour pickups, `false` only the others.
    pub rush: Option<bool>,
    pub min_passengers: Option<u32>,
    pub max_passengers: Option<u32>,
}

impl FilterCriteria {
    #[cfg(test)]
    pub fn is_unconstrained(&self) -> bool {
        *self == FilterCriteria::default()
    }
}

/// Conjunction of every constraint set in `criteria`.
///
/// The rush set comes from `config`, so the flag always reflects the current
/// configuration rather than whatever was in force at load time.
pub fn matches(record: &TripRecord, criteria: &FilterCriteria, config: &PipelineConfig) -> bool {
    if let Some(start) = criteria.start {
        if record.pickup_datetime < start {
            return false;
        }
    }
    if let Some(end) = criteria.end {
        if record.pickup_datetime > end {
            return false;
        }
    }
    if let Some(rush) = criteria.rush {
        if config.is_rush_hour(record.pickup_hour()) != rush {
            return false;
        }
    }
    if let Some(min) = criteria.min_passengers {
        if record.passenger_count < min {
            return false;
        }
    }
    if let Some(max) = criteria.max_passengers {
        if record.passenger_count > max {
            return false;
        }
    }
    true
}
