//! Shared types for the courier tracking service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;

/// Newtype wrapper for courier identifiers to provide type safety
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourierId(String);

impl CourierId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CourierId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CourierId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// Lets map lookups take &str without cloning the key
impl Borrow<str> for CourierId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// One incoming GPS fix for a courier, already validated by the transport layer
#[derive(Debug, Clone)]
pub struct LocationUpdate {
    pub courier_id: CourierId,
    pub lat: f64,
    pub lng: f64,
    pub time: DateTime<Utc>,
}

/// A known store location from the static catalog
#[derive(Debug, Clone, Deserialize)]
pub struct Store {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

/// Append-only record of a courier entering a store's radius
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreEntranceLog {
    pub courier_id: CourierId,
    pub store_name: String,
    pub entrance_time: DateTime<Utc>,
    pub distance_meters: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_courier_id_borrow_lookup() {
        use std::collections::HashMap;
        let mut map: HashMap<CourierId, u32> = HashMap::new();
        map.insert(CourierId::from("C1"), 1);
        assert_eq!(map.get("C1"), Some(&1));
    }

    #[test]
    fn test_entrance_log_serializes_camel_case() {
        let entry = StoreEntranceLog {
            courier_id: CourierId::from("C1"),
            store_name: "Ataşehir".to_string(),
            entrance_time: "2026-08-29T10:00:00Z".parse().unwrap(),
            distance_meters: 42.5,
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"courierId\":\"C1\""));
        assert!(json.contains("\"storeName\""));
        assert!(json.contains("\"entranceTime\""));
        assert!(json.contains("\"distanceMeters\":42.5"));
    }
}
