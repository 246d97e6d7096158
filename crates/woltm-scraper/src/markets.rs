//! Market discovery around a city's representative coordinate.

use chrono::Utc;
use woltm_core::{City, Market};

use crate::client::endpoints::RETAIL_PAGE_PATH;
use crate::client::{Listing, WoltClient};
use crate::error::FetchError;
use crate::normalize::normalize_venue;
use crate::parse_helpers::decode_envelope;
use crate::types::{RawVenue, RetailPage};

impl WoltClient {
    /// Lists the retail markets visible from `city`'s coordinate.
    ///
    /// All sections of the retail page are flattened into one sequence in
    /// page order. Entries without a `venue` object (banners, carousels)
    /// are ignored; venues without an id or slug are skipped and counted.
    /// A failed request yields an empty [`Listing`] with the error attached.
    pub async fn discover(&self, city: &City) -> Listing<Market> {
        tracing::info!(
            city = %city.slug,
            lat = city.latitude,
            lon = city.longitude,
            "discovering markets"
        );
        let lat = city.latitude.to_string();
        let lon = city.longitude.to_string();
        let body = match self
            .get_json(
                &self.consumer_api_url,
                RETAIL_PAGE_PATH,
                &[("lat", lat.as_str()), ("lon", lon.as_str())],
            )
            .await
        {
            Ok(body) => body,
            Err(e) => {
                tracing::error!(city = %city.slug, error = %e, "market discovery request failed");
                return Listing::failed(e);
            }
        };

        let page: RetailPage = match decode_envelope(body, &[]) {
            Ok(page) => page,
            Err(source) => {
                let e = FetchError::Parse {
                    context: format!("retail page for {}", city.slug),
                    source,
                };
                tracing::error!(city = %city.slug, error = %e, "retail page has unexpected shape");
                return Listing::failed(e);
            }
        };

        let scraped_at = Utc::now();
        let mut markets = Vec::new();
        let mut skipped = 0usize;
        for section in page.sections {
            for entry in section.items {
                let Some(venue) = entry.get("venue").cloned() else {
                    continue;
                };
                let market = serde_json::from_value::<RawVenue>(venue)
                    .map_err(|source| FetchError::Parse {
                        context: format!("venue entry in {}", city.slug),
                        source,
                    })
                    .and_then(|raw| {
                        normalize_venue(raw, city, page.city.as_deref(), scraped_at)
                    });
                match market {
                    Ok(market) => markets.push(market),
                    Err(e) => {
                        tracing::warn!(
                            city = %city.slug,
                            section = section.name.as_deref().unwrap_or(""),
                            error = %e,
                            "skipping venue entry"
                        );
                        skipped += 1;
                    }
                }
            }
        }

        tracing::info!(city = %city.slug, markets = markets.len(), skipped, "markets discovered");
        Listing {
            records: markets,
            skipped,
            error: None,
        }
    }
}
