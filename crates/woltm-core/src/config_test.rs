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
fn build_app_config_uses_defaults_when_env_is_empty() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).expect("defaults should be valid");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.output_dir, std::path::PathBuf::from("data"));
    assert_eq!(cfg.restaurant_api_url, "https://restaurant-api.wolt.com");
    assert_eq!(cfg.consumer_api_url, "https://consumer-api.wolt.com");
    assert_eq!(cfg.request_timeout_secs, 30);
    assert_eq!(cfg.min_request_interval_ms, 500);
    assert_eq!(cfg.max_retries, 1);
    assert_eq!(cfg.retry_backoff_base_ms, 1000);
    assert_eq!(cfg.app_language, "en");
    assert!(cfg.user_agent.starts_with("Mozilla/5.0"));
}

#[test]
fn build_app_config_reads_overrides() {
    let mut map = HashMap::new();
    map.insert("WOLTM_OUTPUT_DIR", "/tmp/woltm-out");
    map.insert("WOLTM_MIN_REQUEST_INTERVAL_MS", "1200");
    map.insert("WOLTM_MAX_RETRIES", "0");
    map.insert("WOLTM_APP_LANGUAGE", "az");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.output_dir, std::path::PathBuf::from("/tmp/woltm-out"));
    assert_eq!(cfg.min_request_interval_ms, 1200);
    assert_eq!(cfg.max_retries, 0);
    assert_eq!(cfg.app_language, "az");
}

#[test]
fn build_app_config_strips_trailing_slash_from_base_urls() {
    let mut map = HashMap::new();
    map.insert("WOLTM_CONSUMER_API_URL", "http://127.0.0.1:8080/");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.consumer_api_url, "http://127.0.0.1:8080");
}

#[test]
fn build_app_config_rejects_non_http_base_url() {
    let mut map = HashMap::new();
    map.insert("WOLTM_RESTAURANT_API_URL", "ftp://example.com");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "WOLTM_RESTAURANT_API_URL"),
        "expected InvalidEnvVar(WOLTM_RESTAURANT_API_URL), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_bare_scheme() {
    let mut map = HashMap::new();
    map.insert("WOLTM_CONSUMER_API_URL", "https://");
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(result, Err(ConfigError::InvalidEnvVar { .. })));
}

#[test]
fn build_app_config_fails_with_invalid_interval() {
    let mut map = HashMap::new();
    map.insert("WOLTM_MIN_REQUEST_INTERVAL_MS", "half-a-second");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "WOLTM_MIN_REQUEST_INTERVAL_MS"),
        "expected InvalidEnvVar(WOLTM_MIN_REQUEST_INTERVAL_MS), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_zero_timeout() {
    let mut map = HashMap::new();
    map.insert("WOLTM_REQUEST_TIMEOUT_SECS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "WOLTM_REQUEST_TIMEOUT_SECS")
    );
}

#[test]
fn build_app_config_fails_with_negative_retries() {
    let mut map = HashMap::new();
    map.insert("WOLTM_MAX_RETRIES", "-1");
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "WOLTM_MAX_RETRIES"));
}
