//! City enumeration.

use woltm_core::City;

use crate::client::endpoints::CITIES_PATH;
use crate::client::{Listing, WoltClient};
use crate::error::FetchError;
use crate::normalize::normalize_city;
use crate::parse_helpers::decode_envelope;
use crate::types::{CitiesResponse, RawCity};

impl WoltClient {
    /// Lists every city the platform serves.
    ///
    /// Never fails: a failed request or an unreadable listing yields an
    /// empty [`Listing`] with the error attached; a body that is not an
    /// object with a `results` key counts as unreadable. Records without an id,
    /// name, or coordinate are skipped and counted in `skipped`.
    pub async fn list_cities(&self) -> Listing<City> {
        tracing::info!("fetching cities");
        let body = match self.get_json(&self.restaurant_api_url, CITIES_PATH, &[]).await {
            Ok(body) => body,
            Err(e) => {
                tracing::error!(error = %e, "city listing request failed");
                return Listing::failed(e);
            }
        };

        let response: CitiesResponse = match decode_envelope(body, &["results"]) {
            Ok(response) => response,
            Err(source) => {
                let e = FetchError::Parse {
                    context: "city listing".to_owned(),
                    source,
                };
                tracing::error!(error = %e, "city listing has unexpected shape");
                return Listing::failed(e);
            }
        };

        let mut cities = Vec::with_capacity(response.results.len());
        let mut skipped = 0usize;
        for (index, record) in response.results.into_iter().enumerate() {
            let city = serde_json::from_value::<RawCity>(record)
                .map_err(|source| FetchError::Parse {
                    context: format!("city record #{index}"),
                    source,
                })
                .and_then(normalize_city);
            match city {
                Ok(city) => cities.push(city),
                Err(e) => {
                    tracing::warn!(index, error = %e, "skipping city record");
                    skipped += 1;
                }
            }
        }

        tracing::info!(cities = cities.len(), skipped, "cities enumerated");
        Listing {
            records: cities,
            skipped,
            error: None,
        }
    }
}
