//! Builders for trip records used across unit tests.

use chrono::{NaiveDate, NaiveDateTime};

use crate::record::{DurationCategory, TripRecord};

pub fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2016, 3, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

/// A plausible Manhattan trip picked up on 2016-03-`day` at `hour`:05.
pub fn trip(id: &str, day: u32, hour: u32, passengers: u32) -> TripRecord {
    let pickup = at(day, hour, 5);
    TripRecord {
        id: id.to_string(),
        vendor_id: "1".to_string(),
        pickup_datetime: pickup,
        dropoff_datetime: pickup + chrono::Duration::seconds(720),
        passenger_count: passengers,
        pickup_latitude: 40.75,
        pickup_longitude: -73.98,
        dropoff_latitude: 40.77,
        dropoff_longitude: -73.96,
        store_and_fwd_flag: None,
        trip_duration: 720,
        trip_distance_km: 2.4,
        trip_speed_kmh: 12.0,
        duration_category: DurationCategory::Medium,
    }
}

/// Same as [`trip`] with the derived metrics overridden.
pub fn trip_with(
    id: &str,
    duration_s: i64,
    distance_km: f64,
    speed_kmh: f64,
    category: DurationCategory,
) -> TripRecord {
    TripRecord {
        trip_duration: duration_s,
        trip_distance_km: distance_km,
        trip_speed_kmh: speed_kmh,
        duration_category: category,
        ..trip(id, 14, 12, 1)
    }
}
