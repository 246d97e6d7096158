use std::path::PathBuf;

pub const DEFAULT_RESTAURANT_API_URL: &str = "https://restaurant-api.wolt.com";
pub const DEFAULT_CONSUMER_API_URL: &str = "https://consumer-api.wolt.com";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub output_dir: PathBuf,
    /// Base URL serving the `/v1/cities` listing.
    pub restaurant_api_url: String,
    /// Base URL serving the retail page and venue-content endpoints.
    pub consumer_api_url: String,
    pub request_timeout_secs: u64,
    /// Minimum spacing between two outbound requests, retries included.
    pub min_request_interval_ms: u64,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub user_agent: String,
    /// Value of the `app-language` header; controls the language of
    /// names and descriptions returned by the platform.
    pub app_language: String,
}
