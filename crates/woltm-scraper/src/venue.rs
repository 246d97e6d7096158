//! Venue catalog retrieval.

use woltm_core::Market;

use crate::client::endpoints::venue_content_path;
use crate::client::WoltClient;
use crate::error::FetchError;
use crate::parse_helpers::decode_envelope;
use crate::types::VenueContent;

impl WoltClient {
    /// Fetches the full nested catalog of `market`, keyed by its slug.
    ///
    /// # Errors
    ///
    /// - [`FetchError::MissingField`] if the market has a blank slug.
    /// - [`FetchError::Network`], [`FetchError::Http`], [`FetchError::Parse`]
    ///   as classified by [`WoltClient::request`].
    /// - [`FetchError::Parse`] if the body is JSON but not an object carrying
    ///   `sections` or `items`.
    pub async fn fetch_detail(&self, market: &Market) -> Result<VenueContent, FetchError> {
        if market.slug.trim().is_empty() {
            return Err(FetchError::MissingField {
                entity: "venue",
                field: "slug",
            });
        }
        tracing::info!(venue = %market.slug, "fetching venue content");
        let body = self
            .get_json(&self.consumer_api_url, &venue_content_path(&market.slug), &[])
            .await?;
        let content: VenueContent = decode_envelope(body, &["sections", "items"])
            .map_err(|source| FetchError::Parse {
                context: format!("venue content for {}", market.slug),
                source,
            })?;
        tracing::debug!(
            venue = %market.slug,
            sections = content.sections.len(),
            items = content.items.len(),
            "venue content received"
        );
        Ok(content)
    }
}
