//! Location update fan-out and query entry points
//!
//! The dispatcher is the orchestration core: every incoming location update
//! triggers two independent reactions:
//! - Distance: accumulate the haversine delta on the courier's track
//! - Entrance: scan the store catalog and log entrances within the radius
//!
//! The two reactions touch disjoint state (track store vs entrance log), so
//! they run back to back with no ordering dependency. There are exactly two
//! fixed reactions, so they are invoked directly rather than through an
//! event bus.

#[cfg(test)]
mod tests;

use crate::domain::geo;
use crate::domain::types::{LocationUpdate, StoreEntranceLog};
use crate::infra::metrics::Metrics;
use crate::io::catalog::StoreCatalog;
use crate::services::entrance_log::EntranceLogStore;
use crate::services::track_store::CourierTrackStore;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Default entrance detection radius around a store center
pub const DEFAULT_ENTRANCE_RADIUS_M: f64 = 100.0;

/// Central processor for courier location updates
pub struct LocationDispatcher {
    catalog: Arc<StoreCatalog>,
    tracks: Arc<CourierTrackStore>,
    entrances: Arc<EntranceLogStore>,
    metrics: Arc<Metrics>,
    entrance_radius_m: f64,
}

impl LocationDispatcher {
    pub fn new(
        catalog: Arc<StoreCatalog>,
        tracks: Arc<CourierTrackStore>,
        entrances: Arc<EntranceLogStore>,
        metrics: Arc<Metrics>,
        entrance_radius_m: f64,
    ) -> Self {
        Self { catalog, tracks, entrances, metrics, entrance_radius_m }
    }

    /// Process one validated location update. Infallible: both reactions are
    /// in-memory and total over validated input.
    pub fn submit_location_update(&self, update: &LocationUpdate) {
        let process_start = Instant::now();

        self.react_distance(update);
        self.react_entrances(update);

        let latency_us = process_start.elapsed().as_micros() as u64;
        self.metrics.record_update_processed(latency_us);
    }

    /// Distance reaction: accumulate the delta from the courier's last fix
    fn react_distance(&self, update: &LocationUpdate) {
        let delta_m =
            self.tracks
                .accumulate(&update.courier_id, update.lat, update.lng, update.time);
        self.metrics.record_distance_delta(delta_m);

        debug!(
            courier = %update.courier_id,
            delta_m = format!("{delta_m:.2}"),
            "distance_accumulated"
        );
    }

    /// Entrance reaction: log an entrance for every store whose center is
    /// within the radius, subject to the per-(courier, store) cooldown
    fn react_entrances(&self, update: &LocationUpdate) {
        for store in self.catalog.all() {
            let distance_m =
                geo::haversine_m(update.lat, update.lng, store.lat, store.lng);
            if distance_m > self.entrance_radius_m {
                continue;
            }

            if self.entrances.record_if_allowed(
                &update.courier_id,
                store,
                update.time,
                distance_m,
            ) {
                self.metrics.record_entrance_recorded();
                info!(
                    courier = %update.courier_id,
                    store = %store.name,
                    distance_m = format!("{distance_m:.2}"),
                    "store_entrance_recorded"
                );
            } else {
                self.metrics.record_entrance_suppressed();
            }
        }
    }

    /// Cumulative distance in meters; 0.0 for couriers that never reported
    pub fn get_total_distance(&self, courier_id: &str) -> f64 {
        self.tracks.total_distance(courier_id)
    }

    /// Entrance log snapshot for one courier, in recording order
    pub fn get_entrances(&self, courier_id: &str) -> Vec<StoreEntranceLog> {
        self.entrances.find_by_courier(courier_id)
    }

    /// Number of couriers that have reported at least once
    pub fn courier_count(&self) -> usize {
        self.tracks.courier_count()
    }
}
