//! Lock-free metrics collection
//!
//! All counters are atomics updated on the hot path without locks. The
//! periodic reporter and the Prometheus endpoint read a consistent-enough
//! snapshot via `report()`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::info;

/// Metrics collector shared across the service
pub struct Metrics {
    started: Instant,
    updates_total: AtomicU64,
    entrances_recorded_total: AtomicU64,
    entrances_suppressed_total: AtomicU64,
    /// Total distance accumulated across all couriers, in millimeters
    distance_total_mm: AtomicU64,
    latency_sum_us: AtomicU64,
    latency_count: AtomicU64,
    latency_max_us: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            updates_total: AtomicU64::new(0),
            entrances_recorded_total: AtomicU64::new(0),
            entrances_suppressed_total: AtomicU64::new(0),
            distance_total_mm: AtomicU64::new(0),
            latency_sum_us: AtomicU64::new(0),
            latency_count: AtomicU64::new(0),
            latency_max_us: AtomicU64::new(0),
        }
    }

    /// Record one processed location update and its processing latency
    pub fn record_update_processed(&self, latency_us: u64) {
        self.updates_total.fetch_add(1, Ordering::Relaxed);
        self.latency_sum_us.fetch_add(latency_us, Ordering::Relaxed);
        self.latency_count.fetch_add(1, Ordering::Relaxed);
        self.latency_max_us.fetch_max(latency_us, Ordering::Relaxed);
    }

    /// Record a distance delta accumulated for some courier
    pub fn record_distance_delta(&self, meters: f64) {
        if meters > 0.0 {
            let mm = (meters * 1000.0) as u64;
            self.distance_total_mm.fetch_add(mm, Ordering::Relaxed);
        }
    }

    pub fn record_entrance_recorded(&self) {
        self.entrances_recorded_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_entrance_suppressed(&self) {
        self.entrances_suppressed_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot current values for reporting
    pub fn report(&self, courier_count: usize) -> MetricsSummary {
        let uptime_secs = self.started.elapsed().as_secs().max(1);
        let updates_total = self.updates_total.load(Ordering::Relaxed);
        let latency_count = self.latency_count.load(Ordering::Relaxed);
        let latency_sum = self.latency_sum_us.load(Ordering::Relaxed);

        MetricsSummary {
            uptime_secs,
            updates_total,
            updates_per_sec: updates_total as f64 / uptime_secs as f64,
            avg_latency_us: if latency_count > 0 { latency_sum / latency_count } else { 0 },
            max_latency_us: self.latency_max_us.load(Ordering::Relaxed),
            entrances_recorded_total: self.entrances_recorded_total.load(Ordering::Relaxed),
            entrances_suppressed_total: self.entrances_suppressed_total.load(Ordering::Relaxed),
            distance_total_m: self.distance_total_mm.load(Ordering::Relaxed) as f64 / 1000.0,
            courier_count,
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time metrics snapshot
#[derive(Debug, Clone)]
pub struct MetricsSummary {
    pub uptime_secs: u64,
    pub updates_total: u64,
    pub updates_per_sec: f64,
    pub avg_latency_us: u64,
    pub max_latency_us: u64,
    pub entrances_recorded_total: u64,
    pub entrances_suppressed_total: u64,
    pub distance_total_m: f64,
    pub courier_count: usize,
}

impl MetricsSummary {
    /// Log the summary as one structured line
    pub fn log(&self) {
        info!(
            uptime_secs = %self.uptime_secs,
            updates_total = %self.updates_total,
            updates_per_sec = format!("{:.2}", self.updates_per_sec),
            avg_latency_us = %self.avg_latency_us,
            max_latency_us = %self.max_latency_us,
            entrances_recorded = %self.entrances_recorded_total,
            entrances_suppressed = %self.entrances_suppressed_total,
            distance_total_m = format!("{:.1}", self.distance_total_m),
            couriers = %self.courier_count,
            "metrics_summary"
        );
    }
}
