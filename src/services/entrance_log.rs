//! Store entrance log with per-(courier, store) cooldown
//!
//! Append-only record of entrance events. A new entrance for a
//! (courier, store) pair is only recorded when it is strictly later than
//! `last entrance + cooldown`; an entrance exactly `cooldown` after the last
//! one is still suppressed. The check and the append happen under one lock so
//! concurrent events for the same pair cannot both pass the cooldown check.

use crate::domain::types::{CourierId, Store, StoreEntranceLog};
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::debug;

/// Default minimum interval between two recorded entrances for one pair
pub const DEFAULT_COOLDOWN_SECS: i64 = 60;

#[derive(Default)]
struct EntranceState {
    /// All recorded entrances, in insertion order
    logs: Vec<StoreEntranceLog>,
    /// Last recorded entrance time per (courier, store name)
    last_entrances: FxHashMap<(CourierId, String), DateTime<Utc>>,
}

/// Concurrent entrance log store
pub struct EntranceLogStore {
    cooldown: Duration,
    inner: Mutex<EntranceState>,
}

impl EntranceLogStore {
    pub fn new(cooldown_secs: i64) -> Self {
        Self {
            cooldown: Duration::seconds(cooldown_secs),
            inner: Mutex::new(EntranceState::default()),
        }
    }

    /// Record an entrance unless the pair is still inside its cooldown
    /// window. Returns whether the entrance was recorded.
    pub fn record_if_allowed(
        &self,
        courier_id: &CourierId,
        store: &Store,
        time: DateTime<Utc>,
        distance_meters: f64,
    ) -> bool {
        let mut state = self.inner.lock();

        let key = (courier_id.clone(), store.name.clone());
        if let Some(&last) = state.last_entrances.get(&key) {
            // Strictly after last + cooldown; exactly on the boundary is
            // suppressed, as is any time at or before the last entrance
            if time <= last + self.cooldown {
                debug!(
                    courier = %courier_id,
                    store = %store.name,
                    "entrance_suppressed_by_cooldown"
                );
                return false;
            }
        }

        state.logs.push(StoreEntranceLog {
            courier_id: courier_id.clone(),
            store_name: store.name.clone(),
            entrance_time: time,
            distance_meters,
        });
        state.last_entrances.insert(key, time);
        true
    }

    /// Snapshot of all entrances for one courier, in the order recorded;
    /// empty for unknown couriers.
    pub fn find_by_courier(&self, courier_id: &str) -> Vec<StoreEntranceLog> {
        self.inner
            .lock()
            .logs
            .iter()
            .filter(|log| log.courier_id.as_str() == courier_id)
            .cloned()
            .collect()
    }

    /// Total number of recorded entrances
    pub fn entrance_count(&self) -> usize {
        self.inner.lock().logs.len()
    }
}

impl Default for EntranceLogStore {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN_SECS)
    }
}
