use std::fs;

use market_app::{AppConfig, ConfigError};
use pretty_assertions::assert_eq;

#[test]
fn missing_file_means_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig::load(&dir.path().join("market.ron")).unwrap();
    assert_eq!(config, AppConfig::default());
}

#[test]
fn file_values_override_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("market.ron");
    fs::write(
        &path,
        r#"(
    feed: (base_url: "http://localhost:8080", page_size: 5),
    fetch: (request_timeout_ms: 1500),
)"#,
    )
    .unwrap();

    let config = AppConfig::load(&path).unwrap();

    assert_eq!(config.base_url().unwrap().as_str(), "http://localhost:8080/");
    assert_eq!(config.gate().unwrap().page_size().get(), 5);
    let settings = config.fetch_settings();
    assert_eq!(settings.request_timeout.as_millis(), 1500);
    assert_eq!(
        config.fetch.connect_timeout_ms,
        AppConfig::default().fetch.connect_timeout_ms
    );
}

#[test]
fn malformed_file_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("market.ron");
    fs::write(&path, "(feed: (page_size: \"ten\"))").unwrap();

    let err = AppConfig::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "{err}");
}

#[test]
fn invalid_values_are_rejected_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("market.ron");

    fs::write(&path, "(feed: (base_url: \"not a url\"))").unwrap();
    assert!(matches!(
        AppConfig::load(&path),
        Err(ConfigError::InvalidBaseUrl { .. })
    ));

    fs::write(&path, "(feed: (page_size: 0))").unwrap();
    assert!(matches!(
        AppConfig::load(&path),
        Err(ConfigError::InvalidPageSize)
    ));
}
