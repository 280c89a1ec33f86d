//! Integration tests for configuration loading

use courier_tracker::infra::Config;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_load_config_from_file() {
    let mut temp_file = NamedTempFile::new().unwrap();

    let config_content = r#"
[site]
id = "courier-test"

[http]
port = 9090

[stores]
file = "/tmp/stores.json"

[tracking]
entrance_radius_m = 150.0
entrance_cooldown_secs = 120

[metrics]
interval_secs = 30
"#;

    temp_file.write_all(config_content.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let config = Config::from_file(temp_file.path()).unwrap();

    assert_eq!(config.site_id(), "courier-test");
    assert_eq!(config.http_port(), 9090);
    assert_eq!(config.stores_file(), "/tmp/stores.json");
    assert_eq!(config.entrance_radius_m(), 150.0);
    assert_eq!(config.entrance_cooldown_secs(), 120);
    assert_eq!(config.metrics_interval_secs(), 30);
}

#[test]
fn test_missing_sections_use_defaults() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(b"[http]\nport = 8888\n").unwrap();
    temp_file.flush().unwrap();

    let config = Config::from_file(temp_file.path()).unwrap();

    assert_eq!(config.http_port(), 8888);
    assert_eq!(config.site_id(), "courier-tracker");
    assert_eq!(config.entrance_radius_m(), 100.0);
    assert_eq!(config.entrance_cooldown_secs(), 60);
}

#[test]
fn test_load_from_path_fallback() {
    let config = Config::load_from_path("/nonexistent/config.toml");
    assert_eq!(config.http_port(), 8080);
    assert_eq!(config.stores_file(), "config/stores.json");
    assert_eq!(config.config_file(), "default");
}

#[test]
fn test_malformed_config_is_error() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(b"[http\nport = notanumber").unwrap();
    temp_file.flush().unwrap();

    assert!(Config::from_file(temp_file.path()).is_err());
}
