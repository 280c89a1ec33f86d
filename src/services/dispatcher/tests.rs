//! Tests for the LocationDispatcher

use super::*;
use crate::domain::types::{CourierId, Store};
use chrono::{DateTime, Duration, Utc};

const STORE_LAT: f64 = 41.0082;
const STORE_LNG: f64 = 28.9784;

fn store(name: &str, lat: f64, lng: f64) -> Store {
    Store { name: name.to_string(), lat, lng }
}

fn create_dispatcher(stores: Vec<Store>) -> LocationDispatcher {
    LocationDispatcher::new(
        Arc::new(StoreCatalog::from_stores(stores)),
        Arc::new(CourierTrackStore::new()),
        Arc::new(EntranceLogStore::default()),
        Arc::new(Metrics::new()),
        DEFAULT_ENTRANCE_RADIUS_M,
    )
}

fn t0() -> DateTime<Utc> {
    "2026-08-29T10:00:00Z".parse().unwrap()
}

fn update(courier: &str, lat: f64, lng: f64, time: DateTime<Utc>) -> LocationUpdate {
    LocationUpdate { courier_id: CourierId::from(courier), lat, lng, time }
}

/// Latitude `meters` due north of `lat`; pure-north displacement makes the
/// haversine distance equal to the arc length within floating-point noise
fn north_of(lat: f64, meters: f64) -> f64 {
    lat + (meters / 6_371_000.0).to_degrees()
}

#[test]
fn test_unknown_courier_defaults() {
    let dispatcher = create_dispatcher(vec![store("S1", STORE_LAT, STORE_LNG)]);
    assert_eq!(dispatcher.get_total_distance("nonexistent"), 0.0);
    assert!(dispatcher.get_entrances("nonexistent").is_empty());
}

#[test]
fn test_first_update_zero_distance() {
    let dispatcher = create_dispatcher(vec![]);
    dispatcher.submit_location_update(&update("C1", 41.0082, 28.9784, t0()));
    assert_eq!(dispatcher.get_total_distance("C1"), 0.0);
    assert_eq!(dispatcher.courier_count(), 1);
}

#[test]
fn test_scenario_two_updates_near_store() {
    // Two fixes ~97 m apart, store within 100 m of both
    let dispatcher = create_dispatcher(vec![store("S1", STORE_LAT, STORE_LNG)]);

    dispatcher.submit_location_update(&update("C1", 41.0082, 28.9784, t0()));
    dispatcher.submit_location_update(&update(
        "C1",
        41.0090,
        28.9790,
        t0() + Duration::seconds(10),
    ));

    let total = dispatcher.get_total_distance("C1");
    let expected = geo::haversine_m(41.0082, 28.9784, 41.0090, 28.9790);
    assert!((total - expected).abs() <= expected * 1e-6, "got {total}");
    assert!((95.0..100.0).contains(&total), "got {total}");

    // Both fixes are within the radius but inside the cooldown window:
    // exactly one entrance
    let entrances = dispatcher.get_entrances("C1");
    assert_eq!(entrances.len(), 1);
    assert_eq!(entrances[0].store_name, "S1");
    assert_eq!(entrances[0].entrance_time, t0());
}

#[test]
fn test_accumulation_over_many_updates() {
    let dispatcher = create_dispatcher(vec![]);
    let points = [
        (41.0082, 28.9784),
        (41.0090, 28.9790),
        (41.0075, 28.9801),
        (41.0060, 28.9792),
    ];

    for (i, (lat, lng)) in points.iter().enumerate() {
        dispatcher.submit_location_update(&update(
            "C1",
            *lat,
            *lng,
            t0() + Duration::seconds(i as i64 * 10),
        ));
    }

    let expected: f64 = points
        .windows(2)
        .map(|w| geo::haversine_m(w[0].0, w[0].1, w[1].0, w[1].1))
        .sum();
    let total = dispatcher.get_total_distance("C1");
    assert!((total - expected).abs() <= expected * 1e-6);
}

#[test]
fn test_entrance_inside_radius_recorded() {
    let dispatcher = create_dispatcher(vec![store("S1", STORE_LAT, STORE_LNG)]);
    // ~99.999 m due north of the store center: inside the inclusive boundary
    let lat = north_of(STORE_LAT, 99.999);
    dispatcher.submit_location_update(&update("C1", lat, STORE_LNG, t0()));

    let entrances = dispatcher.get_entrances("C1");
    assert_eq!(entrances.len(), 1);
    assert!(entrances[0].distance_meters <= 100.0);
    assert!(entrances[0].distance_meters > 99.9);
}

#[test]
fn test_entrance_outside_radius_not_recorded() {
    let dispatcher = create_dispatcher(vec![store("S1", STORE_LAT, STORE_LNG)]);
    // 100.01 m away: outside the boundary
    let lat = north_of(STORE_LAT, 100.01);
    dispatcher.submit_location_update(&update("C1", lat, STORE_LNG, t0()));

    assert!(dispatcher.get_entrances("C1").is_empty());
}

#[test]
fn test_cooldown_dedup_through_dispatcher() {
    let dispatcher = create_dispatcher(vec![store("S1", STORE_LAT, STORE_LNG)]);

    dispatcher.submit_location_update(&update("C1", STORE_LAT, STORE_LNG, t0()));
    // 59 s later, still within radius: suppressed
    dispatcher.submit_location_update(&update(
        "C1",
        STORE_LAT,
        STORE_LNG,
        t0() + Duration::seconds(59),
    ));
    assert_eq!(dispatcher.get_entrances("C1").len(), 1);

    // 61 s after the first: a second entrance
    dispatcher.submit_location_update(&update(
        "C1",
        STORE_LAT,
        STORE_LNG,
        t0() + Duration::seconds(61),
    ));
    assert_eq!(dispatcher.get_entrances("C1").len(), 2);
}

#[test]
fn test_one_entrance_per_store_in_range() {
    // Two stores within 100 m of the fix, one far away
    let dispatcher = create_dispatcher(vec![
        store("near_a", STORE_LAT, STORE_LNG),
        store("near_b", north_of(STORE_LAT, 50.0), STORE_LNG),
        store("far", north_of(STORE_LAT, 5_000.0), STORE_LNG),
    ]);

    dispatcher.submit_location_update(&update("C1", STORE_LAT, STORE_LNG, t0()));

    let names: Vec<_> = dispatcher
        .get_entrances("C1")
        .into_iter()
        .map(|e| e.store_name)
        .collect();
    assert_eq!(names, ["near_a", "near_b"]);
}

#[test]
fn test_entrances_are_per_courier() {
    let dispatcher = create_dispatcher(vec![store("S1", STORE_LAT, STORE_LNG)]);

    dispatcher.submit_location_update(&update("C1", STORE_LAT, STORE_LNG, t0()));
    dispatcher.submit_location_update(&update("C2", STORE_LAT, STORE_LNG, t0()));

    assert_eq!(dispatcher.get_entrances("C1").len(), 1);
    assert_eq!(dispatcher.get_entrances("C2").len(), 1);
}

#[test]
fn test_metrics_counters_updated() {
    let metrics = Arc::new(Metrics::new());
    let dispatcher = LocationDispatcher::new(
        Arc::new(StoreCatalog::from_stores(vec![store("S1", STORE_LAT, STORE_LNG)])),
        Arc::new(CourierTrackStore::new()),
        Arc::new(EntranceLogStore::default()),
        metrics.clone(),
        DEFAULT_ENTRANCE_RADIUS_M,
    );

    dispatcher.submit_location_update(&update("C1", STORE_LAT, STORE_LNG, t0()));
    dispatcher.submit_location_update(&update(
        "C1",
        STORE_LAT,
        STORE_LNG,
        t0() + Duration::seconds(10),
    ));

    let summary = metrics.report(dispatcher.courier_count());
    assert_eq!(summary.updates_total, 2);
    assert_eq!(summary.entrances_recorded_total, 1);
    assert_eq!(summary.entrances_suppressed_total, 1);
    assert_eq!(summary.courier_count, 1);
}

#[test]
fn test_concurrent_couriers_independent_totals() {
    let dispatcher = Arc::new(create_dispatcher(vec![]));
    let threads = 8;
    let updates_per_courier = 40;
    let step = 0.0005;

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let dispatcher = dispatcher.clone();
            std::thread::spawn(move || {
                let courier = format!("C{t}");
                for i in 0..updates_per_courier {
                    let lat = 41.0 + i as f64 * step;
                    dispatcher.submit_location_update(&update(
                        &courier,
                        lat,
                        29.0,
                        t0() + Duration::seconds(i as i64),
                    ));
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let expected: f64 = (0..updates_per_courier - 1)
        .map(|i| {
            let lat = 41.0 + i as f64 * step;
            geo::haversine_m(lat, 29.0, lat + step, 29.0)
        })
        .sum();
    for t in 0..threads {
        let total = dispatcher.get_total_distance(&format!("C{t}"));
        assert!(
            (total - expected).abs() <= expected * 1e-6,
            "courier C{t}: expected {expected}, got {total}"
        );
    }
}
