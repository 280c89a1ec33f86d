//! Services - business logic and state management
//!
//! This module contains the core business logic services:
//! - `dispatcher` - Location update fan-out and query entry points
//! - `track_store` - Per-courier running distance state
//! - `entrance_log` - Store entrance log with cooldown deduplication

pub mod dispatcher;
pub mod entrance_log;
pub mod track_store;

// Re-export commonly used types
pub use dispatcher::LocationDispatcher;
pub use entrance_log::EntranceLogStore;
pub use track_store::CourierTrackStore;
