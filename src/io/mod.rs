//! IO modules - external system interfaces
//!
//! This module contains all external IO operations:
//! - `catalog` - Store catalog loading from JSON
//! - `http` - HTTP API server (location ingest, queries, metrics)

pub mod catalog;
pub mod http;

// Re-export commonly used types
pub use catalog::StoreCatalog;
