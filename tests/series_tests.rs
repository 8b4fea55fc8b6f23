// Tests for the bounded temperature series store
//
// These verify chronological ordering, the duplicate-elapsed policies for
// sampled vs. manual appends, and sliding-window eviction at capacity.

use roastlog::{TemperatureSeries, SERIES_CAPACITY};

#[test]
fn seeded_series_holds_charge_at_time_zero() {
    let series = TemperatureSeries::seeded(195.0);

    assert_eq!(series.len(), 1);
    let origin = series.first().unwrap();
    assert_eq!(origin.elapsed_seconds, 0);
    assert_eq!(origin.temperature, 195.0);
}

#[test]
fn sampled_append_requires_strictly_increasing_elapsed() {
    let mut series = TemperatureSeries::seeded(195.0);

    assert!(series.append_sampled(5, 200.0));
    // Duplicate tick within the same second is dropped, first write wins.
    assert!(!series.append_sampled(5, 210.0));
    // Clock jitter going backwards is dropped too.
    assert!(!series.append_sampled(3, 190.0));

    assert_eq!(series.len(), 2);
    assert_eq!(series.last().unwrap().temperature, 200.0);
}

#[test]
fn manual_append_keeps_duplicate_elapsed_as_visible_step() {
    let mut series = TemperatureSeries::seeded(195.0);

    assert!(series.append_sampled(5, 200.0));
    assert!(series.append_manual(5, 201.0));

    assert_eq!(series.len(), 3);
    assert_eq!(series.last().unwrap().temperature, 201.0);

    // Manual writes still cannot go backwards.
    assert!(!series.append_manual(4, 180.0));
    assert_eq!(series.len(), 3);
}

#[test]
fn eviction_drops_oldest_and_keeps_newest() {
    let mut series = TemperatureSeries::seeded(195.0);
    for elapsed in 1..=(SERIES_CAPACITY as u64 + 100) {
        assert!(series.append_sampled(elapsed, 200.0));
    }

    assert_eq!(series.len(), SERIES_CAPACITY);
    // Seed plus the first 100 points were evicted from the front.
    assert_eq!(series.first().unwrap().elapsed_seconds, 101);
    assert_eq!(
        series.last().unwrap().elapsed_seconds,
        SERIES_CAPACITY as u64 + 100
    );
}

#[test]
fn queries_on_empty_series_are_none() {
    let series = TemperatureSeries::new();

    assert!(series.is_empty());
    assert_eq!(series.minimum(), None);
    assert_eq!(series.maximum(), None);
    assert!(series.last().is_none());
}

#[test]
fn minimum_and_maximum_track_contents() {
    let mut series = TemperatureSeries::seeded(195.0);
    series.append_sampled(10, 160.5);
    series.append_sampled(20, 210.0);

    assert_eq!(series.minimum(), Some(160.5));
    assert_eq!(series.maximum(), Some(210.0));
}

#[test]
fn update_origin_rewrites_only_the_time_zero_point() {
    let mut series = TemperatureSeries::seeded(195.0);
    series.update_origin(180.0);
    assert_eq!(series.first().unwrap().temperature, 180.0);

    // Once the front of the window is no longer time zero, nothing changes.
    let mut evicted = TemperatureSeries::seeded(195.0);
    for elapsed in 1..=(SERIES_CAPACITY as u64 + 1) {
        evicted.append_sampled(elapsed, 200.0);
    }
    assert_ne!(evicted.first().unwrap().elapsed_seconds, 0);
    let front_before = *evicted.first().unwrap();
    evicted.update_origin(100.0);
    assert_eq!(*evicted.first().unwrap(), front_before);
}
