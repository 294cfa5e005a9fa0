use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use taxi_trip_analytics::analyzers::TripAnalyzer;
use taxi_trip_analytics::config::PipelineConfig;
use taxi_trip_analytics::loader::load_from_path;
use taxi_trip_analytics::query::FilterParams;
use taxi_trip_analytics::record::TripRecord;
use taxi_trip_analytics::store::{CsvTripStore, TripStore};
use taxi_trip_analytics::validate::RejectReason;

fn fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/sample_trips.csv")
}

fn loaded_store(name: &str, config: &PipelineConfig) -> (CsvTripStore, Vec<TripRecord>) {
    let store = CsvTripStore::new(env::temp_dir().join(name));
    let _ = fs::remove_file(store.path());
    load_from_path(&fixture(), &store, config).expect("Failed to load fixture");
    let records = store.scan().unwrap();
    (store, records)
}

#[test]
fn test_full_pipeline() {
    let config = PipelineConfig::default();
    let store = CsvTripStore::new(env::temp_dir().join("taxi_trip_analytics_it_pipeline.csv"));
    let _ = fs::remove_file(store.path());

    let report = load_from_path(&fixture(), &store, &config).expect("Failed to load fixture");

    assert_eq!(report.rows_read, 29);
    assert_eq!(report.accepted, 20);
    assert_eq!(report.rejected.total(), 9);
    for reason in [
        RejectReason::MissingField,
        RejectReason::MalformedTimestamp,
        RejectReason::InvertedTimestamps,
        RejectReason::NonPositiveDuration,
        RejectReason::DurationOutOfRange,
        RejectReason::PassengerCountOutOfRange,
        RejectReason::CoordinateOutOfBounds,
        RejectReason::ImplausibleSpeed,
        RejectReason::DuplicateId,
    ] {
        assert_eq!(report.rejected.count(reason), 1, "{reason}");
    }

    let records = store.scan().unwrap();
    assert_eq!(records.len(), 20);
    assert!(records.iter().all(|r| !r.id.starts_with("id9")));
    for r in &records {
        let expected = r.trip_distance_km / (r.trip_duration as f64 / 3600.0);
        assert!((r.trip_speed_kmh - expected).abs() < 1e-9, "{}", r.id);
        assert!(r.dropoff_datetime > r.pickup_datetime);
    }

    let analyzer = TripAnalyzer::new(&config);
    let everything = FilterParams::default().parse().unwrap();

    let summary = analyzer.summary(&records, &everything);
    assert_eq!(summary.trips, 20);
    assert!(summary.avg_duration_s > 0.0 && summary.avg_km > 0.0 && summary.avg_kmh > 0.0);

    let mix = analyzer.duration_mix(&records, &everything);
    assert_eq!((mix.short, mix.medium, mix.long), (9, 9, 2));

    let hist = analyzer.speed_histogram(&records, &everything, None);
    assert_eq!(hist.bins.iter().map(|b| b.count).sum::<u64>(), 20);

    let top: Vec<(u32, u64)> = analyzer
        .busiest_hours(&records, &everything, 5)
        .top
        .iter()
        .map(|h| (h.hour, h.trips))
        .collect();
    assert_eq!(top, [(22, 3), (0, 2), (9, 2), (11, 2), (13, 2)]);

    fs::remove_file(store.path()).unwrap();
}

#[test]
fn test_filters_apply_to_every_aggregate() {
    let config = PipelineConfig::default();
    let (store, records) = loaded_store("taxi_trip_analytics_it_filters.csv", &config);
    let analyzer = TripAnalyzer::new(&config);

    let passengers = FilterParams {
        min_passengers: Some("2".to_string()),
        max_passengers: Some("4".to_string()),
        ..Default::default()
    }
    .parse()
    .unwrap();
    assert_eq!(analyzer.summary(&records, &passengers).trips, 3);
    assert_eq!(analyzer.duration_mix(&records, &passengers).total(), 3);

    let march = FilterParams {
        start: Some("2016-03-01".to_string()),
        end: Some("2016-03-31".to_string()),
        ..Default::default()
    }
    .parse()
    .unwrap();
    assert_eq!(analyzer.summary(&records, &march).trips, 3);
    let hist = analyzer.speed_histogram(&records, &march, Some(10.0));
    assert_eq!(hist.bins.iter().map(|b| b.count).sum::<u64>(), 3);

    let rush = FilterParams {
        rush: Some("1".to_string()),
        ..Default::default()
    }
    .parse()
    .unwrap();
    let top: Vec<(u32, u64)> = analyzer
        .busiest_hours(&records, &rush, 24)
        .top
        .iter()
        .map(|h| (h.hour, h.trips))
        .collect();
    assert_eq!(top, [(9, 2), (17, 2), (7, 1), (8, 1), (19, 1)]);

    let off_peak = FilterParams {
        rush: Some("0".to_string()),
        ..Default::default()
    }
    .parse()
    .unwrap();
    assert_eq!(
        analyzer.summary(&records, &rush).trips + analyzer.summary(&records, &off_peak).trips,
        20
    );

    fs::remove_file(store.path()).unwrap();
}

#[test]
fn test_chunked_load_matches_single_chunk() {
    let (whole_store, whole) =
        loaded_store("taxi_trip_analytics_it_whole.csv", &PipelineConfig::default());
    let chunked_config = PipelineConfig {
        chunk_size: 4,
        ..Default::default()
    };
    let (chunked_store, chunked) = loaded_store("taxi_trip_analytics_it_chunked.csv", &chunked_config);

    assert_eq!(whole, chunked);

    fs::remove_file(whole_store.path()).unwrap();
    fs::remove_file(chunked_store.path()).unwrap();
}

#[test]
fn test_failed_load_keeps_previous_store() {
    let config = PipelineConfig::default();
    let (store, before) = loaded_store("taxi_trip_analytics_it_keep.csv", &config);

    let missing = env::temp_dir().join("taxi_trip_analytics_it_missing_source.csv");
    assert!(load_from_path(&missing, &store, &config).is_err());
    assert_eq!(store.scan().unwrap(), before);

    fs::remove_file(store.path()).unwrap();
}
