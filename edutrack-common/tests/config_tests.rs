//! Tests for configuration loading and resolution
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate EDUTRACK_* variables are marked with #[serial].

use edutrack_common::config::{ConfigResolver, TomlConfig, CONFIG_ENV_VAR, PIXEL_ENDPOINT_ENV_VAR, PORT_ENV_VAR};
use edutrack_common::events::RouteEventKind;
use edutrack_common::Error;
use serial_test::serial;
use std::env;
use std::fs;
use tempfile::TempDir;

fn clear_env() {
    env::remove_var(CONFIG_ENV_VAR);
    env::remove_var(PORT_ENV_VAR);
    env::remove_var(PIXEL_ENDPOINT_ENV_VAR);
}

#[test]
fn test_defaults() {
    let config = TomlConfig::default();

    assert_eq!(config.port, 5730);
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.tracking.settle_delay_ms, 500);
    assert_eq!(config.tracking.default_currency, "USD");
    assert_eq!(config.tracking.default_category, "Education");
    assert!(config.tracking.include_default_routes);
    assert_eq!(
        config.tracking.session_ttl(),
        Some(std::time::Duration::from_secs(1800))
    );
    assert!(config.pixel.endpoint.is_none());
    assert!(config.pixel.consent_default);
    assert!(config.data_layer.event_key.is_none());
    assert!(config.routes.is_empty());
}

#[test]
fn test_zero_session_ttl_disables_expiry() {
    let config = TomlConfig::from_toml_str(
        r#"
        [tracking]
        session_ttl_secs = 0
        "#,
    )
    .expect("config should parse");

    assert!(config.tracking.session_ttl().is_none());
}

#[test]
fn test_partial_toml_keeps_defaults() {
    let config = TomlConfig::from_toml_str(
        r#"
        port = 8080

        [tracking]
        settle_delay_ms = 250
        "#,
    )
    .expect("partial config should parse");

    assert_eq!(config.port, 8080);
    assert_eq!(config.tracking.settle_delay_ms, 250);
    assert_eq!(config.tracking.default_currency, "USD");
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_routes_section() {
    let config = TomlConfig::from_toml_str(
        r#"
        [[routes]]
        path = "/scholarships"
        content_name = "Scholarships"
        content_category = "Funding"
        content_ids = ["scholarships"]

        [[routes]]
        path = "/faq"
        event_kind = { custom = "FaqView" }
        content_name = "FAQ"
        content_category = "Support"
        content_ids = ["faq"]
        "#,
    )
    .expect("routes should parse");

    assert_eq!(config.routes.len(), 2);
    assert_eq!(config.routes[0].event_kind, RouteEventKind::ViewContent);
    assert_eq!(
        config.routes[1].event_kind,
        RouteEventKind::Custom("FaqView".to_string())
    );

    let descriptor = config.routes[1].to_descriptor().unwrap();
    assert_eq!(descriptor.content_ids(), &["faq".to_string()]);
}

#[test]
fn test_route_without_ids_rejected() {
    let err = TomlConfig::from_toml_str(
        r#"
        [[routes]]
        path = "/empty"
        content_name = "Empty"
        content_category = "None"
        content_ids = []
        "#,
    )
    .unwrap_err();

    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn test_excessive_settle_delay_rejected() {
    let err = TomlConfig::from_toml_str("[tracking]\nsettle_delay_ms = 600000\n").unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn test_invalid_toml_rejected() {
    let err = TomlConfig::from_toml_str("port = \"not a number\"").unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
#[serial]
fn test_resolver_prefers_cli_path() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let cli = dir.path().join("cli.toml");
    let env_file = dir.path().join("env.toml");
    fs::write(&cli, "port = 1").unwrap();
    fs::write(&env_file, "port = 2").unwrap();
    env::set_var(CONFIG_ENV_VAR, &env_file);

    let resolved = ConfigResolver::with_search_paths(vec![])
        .resolve(Some(&cli))
        .unwrap();
    assert_eq!(resolved, Some(cli));

    clear_env();
}

#[test]
#[serial]
fn test_resolver_uses_env_var() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let env_file = dir.path().join("env.toml");
    fs::write(&env_file, "port = 2").unwrap();
    env::set_var(CONFIG_ENV_VAR, &env_file);

    let resolved = ConfigResolver::with_search_paths(vec![]).resolve(None).unwrap();
    assert_eq!(resolved, Some(env_file));

    clear_env();
}

#[test]
#[serial]
fn test_resolver_missing_explicit_file_is_error() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.toml");

    let result = ConfigResolver::with_search_paths(vec![]).resolve(Some(&missing));
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_resolver_falls_back_to_search_paths_then_defaults() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let absent = dir.path().join("absent.toml");
    let present = dir.path().join("present.toml");
    fs::write(&present, "").unwrap();

    let resolver = ConfigResolver::with_search_paths(vec![absent.clone(), present.clone()]);
    assert_eq!(resolver.resolve(None).unwrap(), Some(present));

    let resolver = ConfigResolver::with_search_paths(vec![absent]);
    assert_eq!(resolver.resolve(None).unwrap(), None);
}

#[test]
#[serial]
fn test_load_applies_env_overrides() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("config.toml");
    fs::write(&file, "port = 7000\n[pixel]\nendpoint = \"http://from-file\"\n").unwrap();

    env::set_var(PORT_ENV_VAR, "7100");
    env::set_var(PIXEL_ENDPOINT_ENV_VAR, "http://from-env");

    let config = TomlConfig::load(Some(&file)).unwrap();
    assert_eq!(config.port, 7100);
    assert_eq!(config.pixel.endpoint.as_deref(), Some("http://from-env"));

    env::set_var(PIXEL_ENDPOINT_ENV_VAR, "");
    let config = TomlConfig::load(Some(&file)).unwrap();
    assert!(config.pixel.endpoint.is_none(), "empty override disables the pixel");

    env::set_var(PORT_ENV_VAR, "not-a-port");
    assert!(TomlConfig::load(Some(&file)).is_err());

    clear_env();
}
