//! Endpoint paths and request URL construction.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::Url;

use crate::error::FetchError;

pub(crate) const CITIES_PATH: &str = "/v1/cities";
pub(crate) const RETAIL_PAGE_PATH: &str = "/v1/pages/retail";
pub(crate) const VENUE_CONTENT_PATH: &str =
    "/consumer-api/venue-content-api/v3/web/venue-content/slug";

/// Characters left unescaped in a path segment (RFC 3986 unreserved).
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Joins `base` and `path`.
///
/// # Errors
///
/// Returns [`FetchError::InvalidUrl`] if the joined string does not parse.
pub(crate) fn build_url(base: &str, path: &str) -> Result<Url, FetchError> {
    let raw = format!("{}{path}", base.trim_end_matches('/'));
    Url::parse(&raw).map_err(|e| FetchError::InvalidUrl {
        url: raw.clone(),
        reason: e.to_string(),
    })
}

/// Appends `params` to `url` as percent-encoded query pairs.
pub(crate) fn append_query(url: &mut Url, params: &[(&str, &str)]) {
    if params.is_empty() {
        return;
    }
    let mut pairs = url.query_pairs_mut();
    for (k, v) in params {
        pairs.append_pair(k, v);
    }
}

/// Path for one venue's catalog. The slug is a single path segment, so
/// anything that would escape it is percent-encoded.
pub(crate) fn venue_content_path(slug: &str) -> String {
    format!("{VENUE_CONTENT_PATH}/{}", utf8_percent_encode(slug, SEGMENT))
}
