use crate::app_config::{AppConfig, DEFAULT_CONSUMER_API_URL, DEFAULT_RESTAURANT_API_URL};
use crate::ConfigError;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/144.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is set to an invalid value.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is set to an invalid value.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable is optional; the lookup is injected so parsing can be
/// tested with a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let base_url = |var: &str, default: &str| -> Result<String, ConfigError> {
        let raw = or_default(var, default);
        parse_base_url(var, &raw)
    };

    let log_level = or_default("WOLTM_LOG_LEVEL", "info");
    let output_dir = PathBuf::from(or_default("WOLTM_OUTPUT_DIR", "data"));

    let restaurant_api_url = base_url("WOLTM_RESTAURANT_API_URL", DEFAULT_RESTAURANT_API_URL)?;
    let consumer_api_url = base_url("WOLTM_CONSUMER_API_URL", DEFAULT_CONSUMER_API_URL)?;

    let request_timeout_secs = parse_u64("WOLTM_REQUEST_TIMEOUT_SECS", "30")?;
    if request_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "WOLTM_REQUEST_TIMEOUT_SECS".to_string(),
            reason: "timeout must be at least one second".to_string(),
        });
    }
    let min_request_interval_ms = parse_u64("WOLTM_MIN_REQUEST_INTERVAL_MS", "500")?;
    let max_retries = parse_u32("WOLTM_MAX_RETRIES", "1")?;
    let retry_backoff_base_ms = parse_u64("WOLTM_RETRY_BACKOFF_BASE_MS", "1000")?;

    let user_agent = or_default("WOLTM_USER_AGENT", DEFAULT_USER_AGENT);
    let app_language = or_default("WOLTM_APP_LANGUAGE", "en");

    Ok(AppConfig {
        log_level,
        output_dir,
        restaurant_api_url,
        consumer_api_url,
        request_timeout_secs,
        min_request_interval_ms,
        max_retries,
        retry_backoff_base_ms,
        user_agent,
        app_language,
    })
}

/// Accepts `http://` and `https://` URLs and strips any trailing slash so
/// endpoint paths can be appended with `format!`.
fn parse_base_url(var: &str, raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let has_host = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .is_some_and(|rest| !rest.is_empty());
    if !has_host {
        return Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("\"{raw}\" is not an http(s) URL"),
        });
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
