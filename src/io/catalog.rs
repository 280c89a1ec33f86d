//! Static store catalog loading
//!
//! The catalog is a JSON array of `{name, lat, lng}` objects, read once at
//! startup. A missing or malformed file is fatal; the catalog never changes
//! after load, so concurrent iteration needs no locking.

use crate::domain::types::Store;
use anyhow::Context;
use std::fs;
use std::path::Path;
use tracing::info;

/// Immutable list of known stores
pub struct StoreCatalog {
    stores: Vec<Store>,
}

impl StoreCatalog {
    /// Load the catalog from a JSON file. Fatal at startup on failure.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read store catalog {}", path.display()))?;
        let stores: Vec<Store> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse store catalog {}", path.display()))?;

        info!(count = %stores.len(), file = %path.display(), "stores_loaded");
        Ok(Self { stores })
    }

    /// Build a catalog from an in-memory list (used by tests and embedding)
    pub fn from_stores(stores: Vec<Store>) -> Self {
        Self { stores }
    }

    /// All stores, in catalog order
    pub fn all(&self) -> &[Store] {
        &self.stores
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_catalog_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(
            r#"[
                {"name": "Ataşehir MMM Migros", "lat": 40.9923307, "lng": 29.1244229},
                {"name": "Novada MMM Migros", "lat": 40.986106, "lng": 29.1161293}
            ]"#
            .as_bytes(),
        )
        .unwrap();
        file.flush().unwrap();

        let catalog = StoreCatalog::from_file(file.path()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.all()[0].name, "Ataşehir MMM Migros");
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(StoreCatalog::from_file("/nonexistent/stores.json").is_err());
    }

    #[test]
    fn test_malformed_json_is_error() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{not json").unwrap();
        file.flush().unwrap();
        assert!(StoreCatalog::from_file(file.path()).is_err());
    }
}
