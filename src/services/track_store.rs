//! Per-courier running track state
//!
//! Concurrent map from courier id to track state (last fix, cumulative
//! distance). The outer map is read-mostly; mutation of a single courier's
//! state happens under that courier's own mutex, so updates for different
//! couriers never contend.

use crate::domain::geo;
use crate::domain::types::CourierId;
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Last recorded fix for a courier
#[derive(Debug, Clone, Copy)]
struct LastFix {
    lat: f64,
    lng: f64,
    #[allow(dead_code)]
    time: DateTime<Utc>,
}

/// Mutable per-courier state, guarded by its own mutex
#[derive(Debug, Default)]
struct TrackState {
    last: Option<LastFix>,
    total_distance_m: f64,
}

/// Concurrent courier track store
#[derive(Default)]
pub struct CourierTrackStore {
    tracks: RwLock<FxHashMap<CourierId, Arc<Mutex<TrackState>>>>,
}

impl CourierTrackStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the existing track for a courier, or atomically create a fresh
    /// zero-state one. Concurrent callers for the same id observe one track.
    fn get_or_create(&self, courier_id: &CourierId) -> Arc<Mutex<TrackState>> {
        if let Some(track) = self.tracks.read().get(courier_id.as_str()) {
            return track.clone();
        }
        self.tracks
            .write()
            .entry(courier_id.clone())
            .or_default()
            .clone()
    }

    /// Apply one fix to a courier's track and return the distance delta.
    ///
    /// The first fix for a courier records the position and adds zero.
    /// Every later fix adds the haversine delta from the previously recorded
    /// position, then overwrites it. Delta computation, accumulation, and the
    /// position overwrite happen as one atomic unit per courier.
    pub fn accumulate(
        &self,
        courier_id: &CourierId,
        lat: f64,
        lng: f64,
        time: DateTime<Utc>,
    ) -> f64 {
        let track = self.get_or_create(courier_id);
        let mut state = track.lock();

        let delta_m = match state.last {
            Some(last) => geo::haversine_m(last.lat, last.lng, lat, lng),
            None => 0.0,
        };
        state.total_distance_m += delta_m;
        state.last = Some(LastFix { lat, lng, time });
        delta_m
    }

    /// Point-in-time cumulative distance in meters; 0.0 for unknown couriers.
    pub fn total_distance(&self, courier_id: &str) -> f64 {
        self.tracks
            .read()
            .get(courier_id)
            .map(|track| track.lock().total_distance_m)
            .unwrap_or(0.0)
    }

    /// Number of couriers that have reported at least once
    pub fn courier_count(&self) -> usize {
        self.tracks.read().len()
    }
}
