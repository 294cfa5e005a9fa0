//! Raw input rows and the canonical trip record they are cleaned into.

use std::fmt;

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// A single untyped row from the raw trip CSV.
///
/// Every column is optional text so that a missing value and a malformed one
/// can be told apart during validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRow {
    pub id: Option<String>,
    pub vendor_id: Option<String>,
    pub pickup_datetime: Option<String>,
    pub dropoff_datetime: Option<String>,
    pub passenger_count: Option<String>,
    pub pickup_longitude: Option<String>,
    pub pickup_latitude: Option<String>,
    pub dropoff_longitude: Option<String>,
    pub dropoff_latitude: Option<String>,
    pub store_and_fwd_flag: Option<String>,
    pub trip_duration: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DurationCategory {
    Short,
    Medium,
    Long,
}

impl DurationCategory {
    /// Report order.
    pub const ALL: [DurationCategory; 3] = [Self::Short, Self::Medium, Self::Long];

    /// `Short` below `short_below_s`, `Long` above `long_above_s`, `Medium`
    /// in between (both ends inclusive).
    pub fn from_duration(seconds: i64, short_below_s: i64, long_above_s: i64) -> Self {
        if seconds < short_below_s {
            DurationCategory::Short
        } else if seconds <= long_above_s {
            DurationCategory::Medium
        } else {
            DurationCategory::Long
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DurationCategory::Short => "Short",
            DurationCategory::Medium => "Medium",
            DurationCategory::Long => "Long",
        }
    }
}

impl fmt::Display for DurationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated, enriched trip. Immutable once written to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRecord {
    pub id: String,
    pub vendor_id: String,
    pub pickup_datetime: NaiveDateTime,
    pub dropoff_datetime: NaiveDateTime,
    pub passenger_count: u32,
    pub pickup_latitude: f64,
    pub pickup_longitude: f64,
    pub dropoff_latitude: f64,
    pub dropoff_longitude: f64,
    pub store_and_fwd_flag: Option<String>,
    pub trip_duration: i64,
    pub trip_distance_km: f64,
    pub trip_speed_kmh: f64,
    pub duration_category: DurationCategory,
}

impl TripRecord {
    pub fn pickup_hour(&self) -> u32 {
        self.pickup_datetime.hour()
    }
}
