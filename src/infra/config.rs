//! Configuration loading from TOML files
//!
//! Config file is selected via the --config command line argument; a missing
//! or unreadable file falls back to defaults with a warning.

use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Service identifier used as the Prometheus label (e.g., "courier-prod")
    #[serde(default = "default_site_id")]
    pub id: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self { id: default_site_id() }
    }
}

fn default_site_id() -> String {
    "courier-tracker".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_http_port")]
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { port: default_http_port() }
    }
}

fn default_http_port() -> u16 {
    8080
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoresConfig {
    /// Path to the store catalog JSON file
    #[serde(default = "default_stores_file")]
    pub file: String,
}

impl Default for StoresConfig {
    fn default() -> Self {
        Self { file: default_stores_file() }
    }
}

fn default_stores_file() -> String {
    "config/stores.json".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackingConfig {
    /// Store entrance detection radius in meters
    #[serde(default = "default_entrance_radius_m")]
    pub entrance_radius_m: f64,
    /// Minimum seconds between two recorded entrances for one courier/store
    #[serde(default = "default_entrance_cooldown_secs")]
    pub entrance_cooldown_secs: i64,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            entrance_radius_m: default_entrance_radius_m(),
            entrance_cooldown_secs: default_entrance_cooldown_secs(),
        }
    }
}

fn default_entrance_radius_m() -> f64 {
    100.0
}

fn default_entrance_cooldown_secs() -> i64 {
    60
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    /// Interval between logged metrics summaries
    #[serde(default = "default_metrics_interval_secs")]
    pub interval_secs: u64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { interval_secs: default_metrics_interval_secs() }
    }
}

fn default_metrics_interval_secs() -> u64 {
    10
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub stores: StoresConfig,
    #[serde(default)]
    pub tracking: TrackingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Main configuration struct used throughout the application
#[derive(Debug, Clone)]
pub struct Config {
    site_id: String,
    http_port: u16,
    stores_file: String,
    entrance_radius_m: f64,
    entrance_cooldown_secs: i64,
    metrics_interval_secs: u64,
    config_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site_id: default_site_id(),
            http_port: default_http_port(),
            stores_file: default_stores_file(),
            entrance_radius_m: default_entrance_radius_m(),
            entrance_cooldown_secs: default_entrance_cooldown_secs(),
            metrics_interval_secs: default_metrics_interval_secs(),
            config_file: "default".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let toml_config: TomlConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        Ok(Self {
            site_id: toml_config.site.id,
            http_port: toml_config.http.port,
            stores_file: toml_config.stores.file,
            entrance_radius_m: toml_config.tracking.entrance_radius_m,
            entrance_cooldown_secs: toml_config.tracking.entrance_cooldown_secs,
            metrics_interval_secs: toml_config.metrics.interval_secs,
            config_file: path.display().to_string(),
        })
    }

    /// Load configuration - tries the TOML file first, falls back to defaults
    pub fn load_from_path(path: &str) -> Self {
        match Self::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Warning: {}. Using defaults.", e);
                Self::default()
            }
        }
    }

    // Getters for all config fields
    pub fn site_id(&self) -> &str {
        &self.site_id
    }

    pub fn http_port(&self) -> u16 {
        self.http_port
    }

    pub fn stores_file(&self) -> &str {
        &self.stores_file
    }

    pub fn entrance_radius_m(&self) -> f64 {
        self.entrance_radius_m
    }

    pub fn entrance_cooldown_secs(&self) -> i64 {
        self.entrance_cooldown_secs
    }

    pub fn metrics_interval_secs(&self) -> u64 {
        self.metrics_interval_secs
    }

    pub fn config_file(&self) -> &str {
        &self.config_file
    }
}
