use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn parse_environment_variants() {
    assert_eq!(parse_environment("development"), Environment::Development);
    assert_eq!(parse_environment("test"), Environment::Test);
    assert_eq!(parse_environment("production"), Environment::Production);
}

#[test]
fn parse_environment_unknown_defaults_to_development() {
    assert_eq!(parse_environment("staging"), Environment::Development);
}

#[test]
fn build_app_config_uses_defaults_for_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).expect("defaults should be valid");

    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.request_timeout_secs, 15);
    assert_eq!(cfg.user_agent, "shopintel/0.1 (brand-insights)");
    assert_eq!(cfg.max_retries, 2);
    assert_eq!(cfg.retry_backoff_base_ms, 500);
    assert_eq!(cfg.inter_request_delay_ms, 250);
    assert_eq!(cfg.max_concurrent_targets, 3);
    assert_eq!(cfg.max_products, 1000);
    assert!(cfg.normalizer_url.is_none());
    assert!(cfg.normalizer_api_key.is_none());
    assert_eq!(cfg.normalizer_timeout_secs, 20);
    assert_eq!(
        cfg.competitors_path,
        std::path::PathBuf::from("./config/competitors.yaml")
    );
}

#[test]
fn build_app_config_reads_overrides() {
    let mut map = HashMap::new();
    map.insert("SHOPINTEL_ENV", "production");
    map.insert("SHOPINTEL_REQUEST_TIMEOUT_SECS", "60");
    map.insert("SHOPINTEL_MAX_CONCURRENT_TARGETS", "8");
    map.insert("SHOPINTEL_NORMALIZER_URL", "http://localhost:9000/structure");
    map.insert("SHOPINTEL_NORMALIZER_API_KEY", "sk-test");

    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.env, Environment::Production);
    assert_eq!(cfg.request_timeout_secs, 60);
    assert_eq!(cfg.max_concurrent_targets, 8);
    assert_eq!(
        cfg.normalizer_url.as_deref(),
        Some("http://localhost:9000/structure")
    );
    assert_eq!(cfg.normalizer_api_key.as_deref(), Some("sk-test"));
}

#[test]
fn build_app_config_treats_blank_normalizer_url_as_unset() {
    let mut map = HashMap::new();
    map.insert("SHOPINTEL_NORMALIZER_URL", "   ");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.normalizer_url.is_none());
}

#[test]
fn build_app_config_rejects_non_numeric_timeout() {
    let mut map = HashMap::new();
    map.insert("SHOPINTEL_REQUEST_TIMEOUT_SECS", "soon");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SHOPINTEL_REQUEST_TIMEOUT_SECS"),
        "expected InvalidEnvVar(SHOPINTEL_REQUEST_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_zero_concurrency() {
    let mut map = HashMap::new();
    map.insert("SHOPINTEL_MAX_CONCURRENT_TARGETS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SHOPINTEL_MAX_CONCURRENT_TARGETS"),
        "expected InvalidEnvVar(SHOPINTEL_MAX_CONCURRENT_TARGETS), got: {result:?}"
    );
}

#[test]
fn debug_output_redacts_api_key() {
    let mut map = HashMap::new();
    map.insert("SHOPINTEL_NORMALIZER_API_KEY", "sk-very-secret");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("sk-very-secret"));
    assert!(rendered.contains("[redacted]"));
}
