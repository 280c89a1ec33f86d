//! Domain models - core business types and geometry
//!
//! This module contains the canonical data types used throughout the system:
//! - `LocationUpdate` - a validated courier GPS fix
//! - `CourierId` - typed courier identifier
//! - `Store` - a catalog entry
//! - `StoreEntranceLog` - a recorded entrance event
//! - `geo` - haversine distance primitive

pub mod geo;
pub mod types;
