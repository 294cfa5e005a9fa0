//! Per-row cleaning, enrichment and rejection.

use std::fmt;

use serde::Serialize;

use crate::config::PipelineConfig;
use crate::geo::haversine_distance_km;
use crate::parser::{parse_number, parse_timestamp, required};
use crate::record::{DurationCategory, RawRow, TripRecord};

/// Why a raw row was kept out of the store.
///
/// Closed on purpose: the tally in [`crate::stats::RejectionTally`] matches on
/// every variant, so a new reason has to be added there as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RejectReason {
    MissingField,
    MalformedField,
    MalformedTimestamp,
    InvertedTimestamps,
    NonPositiveDuration,
    DurationOutOfRange,
    PassengerCountOutOfRange,
    CoordinateOutOfBounds,
    ImplausibleSpeed,
    DuplicateId,
}

impl RejectReason {
    pub const ALL: [RejectReason; 10] = [
        Self::MissingField,
        Self::MalformedField,
        Self::MalformedTimestamp,
        Self::InvertedTimestamps,
        Self::NonPositiveDuration,
        Self::DurationOutOfRange,
        Self::PassengerCountOutOfRange,
        Self::CoordinateOutOfBounds,
        Self::ImplausibleSpeed,
        Self::DuplicateId,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::MissingField => "MissingField",
            RejectReason::MalformedField => "MalformedField",
            RejectReason::MalformedTimestamp => "MalformedTimestamp",
            RejectReason::InvertedTimestamps => "InvertedTimestamps",
            RejectReason::NonPositiveDuration => "NonPositiveDuration",
            RejectReason::DurationOutOfRange => "DurationOutOfRange",
            RejectReason::PassengerCountOutOfRange => "PassengerCountOutOfRange",
            RejectReason::CoordinateOutOfBounds => "CoordinateOutOfBounds",
            RejectReason::ImplausibleSpeed => "ImplausibleSpeed",
            RejectReason::DuplicateId => "DuplicateId",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cleans one raw row into a [`TripRecord`], or names the first check it fails.
///
/// Check order: presence of every essential field, numeric parsing, timestamp
/// parsing, timestamp order, duration, passenger count, coordinates, and
/// finally the derived speed. Duplicate ids span rows and are the loader's job.
pub fn validate_and_enrich(row: &RawRow, config: &PipelineConfig) -> Result<TripRecord, RejectReason> {
    let id = required(row.id.as_deref())?;
    let vendor_id = required(row.vendor_id.as_deref())?;
    let pickup_raw = required(row.pickup_datetime.as_deref())?;
    let dropoff_raw = required(row.dropoff_datetime.as_deref())?;
    let passengers_raw = required(row.passenger_count.as_deref())?;
    let pickup_lon_raw = required(row.pickup_longitude.as_deref())?;
    let pickup_lat_raw = required(row.pickup_latitude.as_deref())?;
    let dropoff_lon_raw = required(row.dropoff_longitude.as_deref())?;
    let dropoff_lat_raw = required(row.dropoff_latitude.as_deref())?;
    let duration_raw = required(row.trip_duration.as_deref())?;

    let passenger_count: i64 = parse_number(passengers_raw)?;
    let pickup_longitude: f64 = parse_number(pickup_lon_raw)?;
    let pickup_latitude: f64 = parse_number(pickup_lat_raw)?;
    let dropoff_longitude: f64 = parse_number(dropoff_lon_raw)?;
    let dropoff_latitude: f64 = parse_number(dropoff_lat_raw)?;
    let trip_duration: i64 = parse_number(duration_raw)?;

    let pickup_datetime = parse_timestamp(pickup_raw)?;
    let dropoff_datetime = parse_timestamp(dropoff_raw)?;
    if dropoff_datetime <= pickup_datetime {
        return Err(RejectReason::InvertedTimestamps);
    }

    if trip_duration <= 0 {
        return Err(RejectReason::NonPositiveDuration);
    }
    if trip_duration < config.min_duration_s || trip_duration > config.max_duration_s {
        return Err(RejectReason::DurationOutOfRange);
    }

    if passenger_count < i64::from(config.min_passengers)
        || passenger_count > i64::from(config.max_passengers)
    {
        return Err(RejectReason::PassengerCountOutOfRange);
    }

    let bbox = &config.bounding_box;
    if !bbox.contains(pickup_latitude, pickup_longitude)
        || !bbox.contains(dropoff_latitude, dropoff_longitude)
    {
        return Err(RejectReason::CoordinateOutOfBounds);
    }

    let trip_distance_km = haversine_distance_km(
        pickup_latitude,
        pickup_longitude,
        dropoff_latitude,
        dropoff_longitude,
    );
    // trip_duration > 0 was established above.
    let trip_speed_kmh = trip_distance_km / (trip_duration as f64 / 3600.0);
    if !trip_speed_kmh.is_finite() || trip_speed_kmh > config.max_speed_kmh {
        return Err(RejectReason::ImplausibleSpeed);
    }

    Ok(TripRecord {
        id: id.to_string(),
        vendor_id: vendor_id.to_string(),
        pickup_datetime,
        dropoff_datetime,
        passenger_count: passenger_count as u32,
        pickup_latitude,
        pickup_longitude,
        dropoff_latitude,
        dropoff_longitude,
        store_and_fwd_flag: row
            .store_and_fwd_flag
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        trip_duration,
        trip_distance_km,
        trip_speed_kmh,
        duration_category: DurationCategory::from_duration(
            trip_duration,
            config.short_below_s,
            config.long_above_s,
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_row() -> RawRow {
        RawRow {
            id: Some("id2875421".to_string()),
            vendor_id: Some("2".to_string()),
            pickup_datetime: Some("2016-03-14 17:24:55".to_string()),
            dropoff_datetime: Some("2016-03-14 17:32:30".to_string()),
            passenger_count: Some("1".to_string()),
            pickup_longitude: Some("-73.982154846191406".to_string()),
            pickup_latitude: Some("40.767936706542969".to_string()),
            dropoff_longitude: Some("-73.964630126953125".to_string()),
            dropoff_latitude: Some("40.765602111816406".to_string()),
            store_and_fwd_flag: Some("N".to_string()),
            trip_duration: Some("455".to_string()),
        }
    }

    fn check(row: &RawRow) -> Result<TripRecord, RejectReason> {
        validate_and_enrich(row, &PipelineConfig::default())
    }

    #[test]
    fn test_valid_row_is_enriched() {
        let record = check(&raw_row()).unwrap();

        assert_eq!(record.id, "id2875421");
        assert_eq!(record.passenger_count, 1);
        assert_eq!(record.trip_duration, 455);
        assert_eq!(record.store_and_fwd_flag.as_deref(), Some("N"));
        assert_eq!(record.duration_category, DurationCategory::Short);
        assert!(record.trip_distance_km > 1.4 && record.trip_distance_km < 1.6);

        let expected_speed = record.trip_distance_km / (455.0 / 3600.0);
        assert!((record.trip_speed_kmh - expected_speed).abs() < 1e-9);
    }

    #[test]
    fn test_duration_below_floor_is_out_of_range() {
        let row = RawRow {
            trip_duration: Some("30".to_string()),
            ..raw_row()
        };
        assert_eq!(check(&row), Err(RejectReason::DurationOutOfRange));
    }

    #[test]
    fn test_duration_above_ceiling_is_out_of_range() {
        let row = RawRow {
            dropoff_datetime: Some("2016-03-16 17:24:55".to_string()),
            trip_duration: Some("86401".to_string()),
            ..raw_row()
        };
        assert_eq!(check(&row), Err(RejectReason::DurationOutOfRange));
    }

    #[test]
    fn test_non_positive_duration() {
        for d in ["0", "-5"] {
            let row = RawRow {
                trip_duration: Some(d.to_string()),
                ..raw_row()
            };
            assert_eq!(check(&row), Err(RejectReason::NonPositiveDuration));
        }
    }

    #[test]
    fn test_missing_and_blank_fields() {
        let row = RawRow {
            pickup_latitude: None,
            ..raw_row()
        };
        assert_eq!(check(&row), Err(RejectReason::MissingField));

        let row = RawRow {
            id: Some("".to_string()),
            ..raw_row()
        };
        assert_eq!(check(&row), Err(RejectReason::MissingField));
    }

    #[test]
    fn test_store_and_fwd_flag_is_optional() {
        let row = RawRow {
            store_and_fwd_flag: None,
            ..raw_row()
        };
        assert_eq!(check(&row).unwrap().store_and_fwd_flag, None);
    }

    #[test]
    fn test_malformed_number() {
        let row = RawRow {
            passenger_count: Some("two".to_string()),
            ..raw_row()
        };
        assert_eq!(check(&row), Err(RejectReason::MalformedField));
    }

    #[test]
    fn test_malformed_timestamp() {
        let row = RawRow {
            pickup_datetime: Some("2016/03/14 17:24".to_string()),
            ..raw_row()
        };
        assert_eq!(check(&row), Err(RejectReason::MalformedTimestamp));
    }

    #[test]
    fn test_dropoff_not_after_pickup() {
        let row = RawRow {
            dropoff_datetime: Some("2016-03-14 17:24:55".to_string()),
            ..raw_row()
        };
        assert_eq!(check(&row), Err(RejectReason::InvertedTimestamps));

        let row = RawRow {
            dropoff_datetime: Some("2016-03-14 17:00:00".to_string()),
            ..raw_row()
        };
        assert_eq!(check(&row), Err(RejectReason::InvertedTimestamps));
    }

    #[test]
    fn test_passenger_count_bounds() {
        for (count, ok) in [("0", false), ("1", true), ("6", true), ("7", false)] {
            let row = RawRow {
                passenger_count: Some(count.to_string()),
                ..raw_row()
            };
            assert_eq!(check(&row).is_ok(), ok, "passengers {count}");
            if !ok {
                assert_eq!(check(&row), Err(RejectReason::PassengerCountOutOfRange));
            }
        }
    }

    #[test]
    fn test_passenger_bound_is_configurable() {
        let config = PipelineConfig {
            max_passengers: 9,
            ..Default::default()
        };
        let row = RawRow {
            passenger_count: Some("8".to_string()),
            ..raw_row()
        };
        assert!(validate_and_enrich(&row, &config).is_ok());
    }

    #[test]
    fn test_coordinates_outside_box() {
        let row = RawRow {
            dropoff_latitude: Some("0.0".to_string()),
            dropoff_longitude: Some("0.0".to_string()),
            ..raw_row()
        };
        assert_eq!(check(&row), Err(RejectReason::CoordinateOutOfBounds));
    }

    #[test]
    fn test_implausible_speed() {
        // Roughly 55 km across the box in 60 seconds.
        let row = RawRow {
            pickup_latitude: Some("40.45".to_string()),
            pickup_longitude: Some("-74.25".to_string()),
            dropoff_latitude: Some("40.95".to_string()),
            dropoff_longitude: Some("-73.65".to_string()),
            dropoff_datetime: Some("2016-03-14 17:25:55".to_string()),
            trip_duration: Some("60".to_string()),
            ..raw_row()
        };
        assert_eq!(check(&row), Err(RejectReason::ImplausibleSpeed));
    }

    #[test]
    fn test_first_failing_check_wins() {
        // Out-of-range passengers and coordinates: passengers are checked first.
        let row = RawRow {
            passenger_count: Some("0".to_string()),
            pickup_latitude: Some("10.0".to_string()),
            ..raw_row()
        };
        assert_eq!(check(&row), Err(RejectReason::PassengerCountOutOfRange));
    }

    #[test]
    fn test_category_thresholds_on_accepted_rows() {
        for (secs, expected) in [
            (599, DurationCategory::Short),
            (600, DurationCategory::Medium),
            (1800, DurationCategory::Medium),
            (1801, DurationCategory::Long),
        ] {
            let row = RawRow {
                dropoff_datetime: Some("2016-03-14 18:24:55".to_string()),
                trip_duration: Some(secs.to_string()),
                ..raw_row()
            };
            assert_eq!(check(&row).unwrap().duration_category, expected, "{secs}s");
        }
    }
}
