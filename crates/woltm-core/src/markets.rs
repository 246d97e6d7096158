use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A city served by the platform. Drives market discovery; never emitted
/// to the output tables itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    /// Platform city ID. Numeric IDs are stored in their decimal form.
    pub id: String,
    pub name: String,
    /// URL slug, e.g. `"baku"`. Empty when the listing omits it.
    pub slug: String,
    /// ISO alpha-3 country code when the listing provides one.
    pub country: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

/// How far a market got through the venue-detail stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailStatus {
    /// Discovered, detail not yet requested.
    Pending,
    /// Catalog fetched and items extracted.
    Extracted,
    /// Detail request failed; the row carries discovery-stage fields only.
    Failed,
}

impl std::fmt::Display for DetailStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DetailStatus::Pending => write!(f, "pending"),
            DetailStatus::Extracted => write!(f, "extracted"),
            DetailStatus::Failed => write!(f, "failed"),
        }
    }
}

/// A single merchant storefront (venue) on the platform.
///
/// Built from the retail listing during discovery; `description` and `tags`
/// are overwritten from the venue-content payload when that fetch succeeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Market {
    pub id: String,
    pub name: String,
    /// Stable human-readable key used for the venue-content lookup.
    pub slug: String,
    pub address: Option<String>,
    pub city: String,
    pub city_slug: String,
    pub country: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub rating_score: Option<f64>,
    pub rating_volume: Option<u64>,
    pub price_range: Option<u8>,
    pub online: bool,
    pub delivers: bool,
    /// Delivery fee in major currency units.
    pub delivery_price: f64,
    pub estimate_minutes: Option<u32>,
    /// Display label such as `"25-35"`.
    pub estimate_range: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub detail_status: DetailStatus,
    pub scraped_at: DateTime<Utc>,
}

impl Market {
    /// Returns `true` when the market has a rating worth averaging.
    #[must_use]
    pub fn is_rated(&self) -> bool {
        self.rating_score.is_some_and(|s| s > 0.0)
    }
}
