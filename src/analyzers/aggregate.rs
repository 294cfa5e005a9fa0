use crate::analyzers::types::Summary;
use crate::analyzers::utility::Mean;
use crate::record::TripRecord;

/// Trip count and mean duration, distance and speed over `records`.
pub fn summarize<'a>(records: impl IntoIterator<Item = &'a TripRecord>) -> Summary {
    let mut trips = 0u64;
    let mut duration = Mean::default();
    let mut distance = Mean::default();
    let mut speed = Mean::default();

    for r in records {
        trips += 1;
        duration.add(r.trip_duration as f64);
        distance.add(r.trip_distance_km);
        speed.add(r.trip_speed_kmh);
    }

    Summary {
        trips,
        avg_duration_s: duration.value(),
        avg_km: distance.value(),
        avg_kmh: speed.value(),
    }
}
