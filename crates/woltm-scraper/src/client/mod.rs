//! Fault-tolerant HTTP client for the platform's public catalog API.

pub(crate) mod endpoints;

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, Url};

use crate::error::FetchError;
use crate::rate_limit::retry_with_backoff;
use crate::throttle::Throttle;

const CLIENT_VERSION: &str = "1.16.76";

/// Tunables for [`WoltClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL serving the cities listing.
    pub restaurant_api_url: String,
    /// Base URL serving the retail page and venue-content endpoints.
    pub consumer_api_url: String,
    pub timeout: Duration,
    pub min_request_interval: Duration,
    /// Additional attempts after a network failure. `0` disables retries.
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub user_agent: String,
    pub app_language: String,
}

impl ClientConfig {
    #[must_use]
    pub fn from_app_config(config: &woltm_core::AppConfig) -> Self {
        Self {
            restaurant_api_url: config.restaurant_api_url.clone(),
            consumer_api_url: config.consumer_api_url.clone(),
            timeout: Duration::from_secs(config.request_timeout_secs),
            min_request_interval: Duration::from_millis(config.min_request_interval_ms),
            max_retries: config.max_retries,
            retry_backoff_base_ms: config.retry_backoff_base_ms,
            user_agent: config.user_agent.clone(),
            app_language: config.app_language.clone(),
        }
    }
}

/// Records produced by a listing call together with what was dropped.
///
/// Listing operations never fail outright: a failed request yields an empty
/// `records` vector and the classified error in `error`, so the caller can
/// count it and move on.
#[derive(Debug)]
pub struct Listing<T> {
    pub records: Vec<T>,
    /// Records skipped because a required identifying field was absent.
    pub skipped: usize,
    pub error: Option<FetchError>,
}

impl<T> Listing<T> {
    pub(crate) fn failed(error: FetchError) -> Self {
        Self {
            records: Vec::new(),
            skipped: 0,
            error: Some(error),
        }
    }
}

/// HTTP client that gates every request through a [`Throttle`] and returns
/// classified [`FetchError`]s instead of raw transport errors.
///
/// Network failures are retried up to `max_retries` times with jittered
/// back-off; each attempt waits on the throttle again.
pub struct WoltClient {
    pub(crate) client: Client,
    pub(crate) throttle: Throttle,
    pub(crate) restaurant_api_url: String,
    pub(crate) consumer_api_url: String,
    max_retries: u32,
    retry_backoff_base_ms: u64,
}

impl WoltClient {
    /// Creates a client with the configured timeout, headers, throttle, and
    /// retry policy.
    ///
    /// # Errors
    ///
    /// Returns the underlying `reqwest::Error` if the HTTP client cannot be
    /// constructed (e.g., invalid TLS config).
    pub fn new(config: &ClientConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&config.user_agent)
            .default_headers(default_headers(&config.app_language))
            .build()?;
        Ok(Self {
            client,
            throttle: Throttle::new(config.min_request_interval),
            restaurant_api_url: config.restaurant_api_url.clone(),
            consumer_api_url: config.consumer_api_url.clone(),
            max_retries: config.max_retries,
            retry_backoff_base_ms: config.retry_backoff_base_ms,
        })
    }

    /// Sends one request and parses the body as JSON.
    ///
    /// Waits on the throttle immediately before every transmission.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Network`]: connect, timeout, or body-read failure after retries.
    /// - [`FetchError::Http`]: any non-2xx status (not retried).
    /// - [`FetchError::Parse`]: body is not valid JSON (not retried).
    pub async fn request(
        &self,
        method: Method,
        url: &Url,
        params: &[(&str, &str)],
    ) -> Result<serde_json::Value, FetchError> {
        let mut url = url.clone();
        endpoints::append_query(&mut url, params);

        retry_with_backoff(self.max_retries, self.retry_backoff_base_ms, || {
            let method = method.clone();
            let url = url.clone();
            async move {
                self.throttle.wait().await;
                tracing::debug!(%method, %url, "sending request");

                let response = self
                    .client
                    .request(method, url.clone())
                    .send()
                    .await
                    .map_err(|source| FetchError::Network {
                        url: url.to_string(),
                        source,
                    })?;

                let status = response.status();
                if !status.is_success() {
                    return Err(FetchError::Http {
                        status: status.as_u16(),
                        url: url.to_string(),
                    });
                }

                let body = response.text().await.map_err(|source| FetchError::Network {
                    url: url.to_string(),
                    source,
                })?;
                serde_json::from_str::<serde_json::Value>(&body).map_err(|source| {
                    FetchError::Parse {
                        context: url.to_string(),
                        source,
                    }
                })
            }
        })
        .await
    }

    /// Convenience wrapper for `GET base + path`.
    pub(crate) async fn get_json(
        &self,
        base: &str,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<serde_json::Value, FetchError> {
        let url = endpoints::build_url(base, path)?;
        self.request(Method::GET, &url, params).await
    }
}

/// Header set the platform's web client sends with every API call.
fn default_headers(app_language: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        reqwest::header::ACCEPT,
        HeaderValue::from_static("application/json, text/plain, */*"),
    );
    headers.insert(
        reqwest::header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-GB,en-US;q=0.9,en;q=0.8"),
    );
    headers.insert(
        reqwest::header::ORIGIN,
        HeaderValue::from_static("https://wolt.com"),
    );
    headers.insert(
        reqwest::header::REFERER,
        HeaderValue::from_static("https://wolt.com/"),
    );
    headers.insert(
        HeaderName::from_static("platform"),
        HeaderValue::from_static("Web"),
    );
    headers.insert(
        HeaderName::from_static("client-version"),
        HeaderValue::from_static(CLIENT_VERSION),
    );
    headers.insert(
        HeaderName::from_static("clientversionnumber"),
        HeaderValue::from_static(CLIENT_VERSION),
    );

    let language = HeaderValue::from_str(app_language).unwrap_or_else(|e| {
        tracing::warn!(
            app_language,
            error = %e,
            "app language is not a valid header value; falling back to \"en\""
        );
        HeaderValue::from_static("en")
    });
    headers.insert(HeaderName::from_static("app-language"), language);
    headers
}
