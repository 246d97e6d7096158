//! Platform API response types.
//!
//! ## Observed shapes
//!
//! ### Cities (`GET /v1/cities`)
//! `{"results": [...]}`. City ids are usually hex strings but older
//! payloads wrap them as `{"$oid": "..."}`; both are accepted. The
//! coordinate is GeoJSON: `location.coordinates = [lon, lat]`.
//!
//! ### Retail page (`GET /v1/pages/retail?lat=&lon=`)
//! A list of display sections. Only entries carrying a `venue` object are
//! markets; banners and carousels sit alongside them and are ignored.
//! `venue.location` is a bare `[lon, lat]` pair. Fees are integer minor
//! units (`delivery_price_int`).
//!
//! ### Venue content (`GET .../venue-content/slug/{slug}`)
//! Two layouts are in the wild:
//! - sections carrying `items` inline;
//! - sections carrying `categories`, each listing `item_ids` that point into
//!   a top-level `items` table.
//!
//! Either may nest further via `categories`/`subsections`. Prices are
//! integer minor units. `original_price` is present only on discounted
//! items. `dietary_preferences` and `tags` are strings on some venues and
//! `{id, name}` objects on others.
//!
//! Records are decoded field-by-field with lenient helpers so that one
//! odd field degrades to its default instead of failing the venue.

use serde::Deserialize;

use crate::parse_helpers::{flexible_id, flexible_id_vec, lenient, lenient_vec};

/// Top-level response from the cities listing.
#[derive(Debug, Deserialize)]
pub struct CitiesResponse {
    /// Raw city records, decoded one at a time so a bad record is skipped
    /// rather than failing the listing.
    #[serde(default)]
    pub results: Vec<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawCity {
    #[serde(default, deserialize_with = "flexible_id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub country_code_alpha3: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub location: Option<RawPoint>,
}

/// GeoJSON point; `coordinates` is `[lon, lat]`.
#[derive(Debug, Default, Deserialize)]
pub struct RawPoint {
    #[serde(default, deserialize_with = "lenient")]
    pub coordinates: Vec<f64>,
}

/// Top-level response from the retail page.
#[derive(Debug, Deserialize)]
pub struct RetailPage {
    /// Display name of the city the coordinate resolved to.
    #[serde(default, deserialize_with = "lenient")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub sections: Vec<RetailSection>,
}

#[derive(Debug, Deserialize)]
pub struct RetailSection {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    /// Section entries; only those with a `venue` key are markets.
    #[serde(default, deserialize_with = "lenient")]
    pub items: Vec<serde_json::Value>,
}

/// A venue stub as it appears in the retail listing.
#[derive(Debug, Default, Deserialize)]
pub struct RawVenue {
    #[serde(default, deserialize_with = "flexible_id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub country: Option<String>,
    /// `[lon, lat]`.
    #[serde(default, deserialize_with = "lenient")]
    pub location: Vec<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub rating: Option<RawRating>,
    #[serde(default, deserialize_with = "lenient")]
    pub price_range: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub online: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub delivers: Option<bool>,
    /// Delivery fee in minor units.
    #[serde(default, deserialize_with = "lenient")]
    pub delivery_price_int: Option<i64>,
    /// Estimated delivery time in minutes.
    #[serde(default, deserialize_with = "lenient")]
    pub estimate: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub estimate_range: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub short_description: Option<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub tags: Vec<TagRef>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawRating {
    #[serde(default, deserialize_with = "lenient")]
    pub score: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub volume: Option<i64>,
}

/// A tag or dietary preference: either a bare string or an `{id, name}`
/// object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TagRef {
    Name(String),
    Object {
        #[serde(default, deserialize_with = "flexible_id")]
        id: Option<String>,
        #[serde(default, deserialize_with = "lenient")]
        name: Option<String>,
    },
}

impl TagRef {
    /// The tag's identifier, preferring `id` over `name` for object tags.
    #[must_use]
    pub fn label(&self) -> Option<String> {
        match self {
            TagRef::Name(s) => crate::parse_helpers::non_blank(Some(s.clone())),
            TagRef::Object { id, name } => crate::parse_helpers::non_blank(
                id.clone().or_else(|| name.clone()),
            ),
        }
    }
}

/// Full catalog of one venue as returned by the venue-content endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct VenueContent {
    #[serde(default, deserialize_with = "lenient")]
    pub venue: Option<RawVenueInfo>,
    /// Item table referenced by `item_ids` in category sections.
    #[serde(default, deserialize_with = "lenient_vec")]
    pub items: Vec<RawItem>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub sections: Vec<RawSection>,
}

/// Venue metadata carried by the venue-content payload.
#[derive(Debug, Default, Deserialize)]
pub struct RawVenueInfo {
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub short_description: Option<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub tags: Vec<TagRef>,
}

/// One node of the catalog tree.
#[derive(Debug, Default, Deserialize)]
pub struct RawSection {
    #[serde(default, deserialize_with = "flexible_id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub slug: Option<String>,
    /// Items listed inline.
    #[serde(default, deserialize_with = "lenient_vec")]
    pub items: Vec<RawItem>,
    /// References into [`VenueContent::items`].
    #[serde(default, deserialize_with = "flexible_id_vec")]
    pub item_ids: Vec<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub categories: Vec<RawSection>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub subsections: Vec<RawSection>,
}

impl RawSection {
    /// Child sections in payload order, `categories` first.
    pub fn children(&self) -> impl DoubleEndedIterator<Item = &RawSection> {
        self.categories.iter().chain(self.subsections.iter())
    }
}

/// A catalog entry. Monetary values are integer minor units.
#[derive(Debug, Default, Deserialize)]
pub struct RawItem {
    #[serde(default, deserialize_with = "flexible_id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub price: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub original_price: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub unit_info: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub unit_price: Option<RawUnitPrice>,
    /// GTINs are occasionally sent as JSON numbers.
    #[serde(default, deserialize_with = "flexible_id")]
    pub barcode_gtin: Option<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub images: Vec<RawImage>,
    #[serde(default, deserialize_with = "lenient")]
    pub purchasable_balance: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub quantity_left: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub max_quantity_per_purchase: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub min_quantity_per_purchase: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub alcohol_permille: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub vat_percentage: Option<f64>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub dietary_preferences: Vec<TagRef>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub tags: Vec<TagRef>,
    /// Non-null when the item is out of stock or otherwise unorderable.
    #[serde(default)]
    pub disabled_info: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub is_wolt_plus_only: Option<bool>,
    /// Deposit as a bare minor-unit number or an object with `price`/`amount`.
    #[serde(default)]
    pub deposit: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawUnitPrice {
    /// Price per `base` units, in minor units.
    #[serde(default, deserialize_with = "lenient")]
    pub price: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub base: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub unit: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawImage {
    #[serde(default, deserialize_with = "lenient")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub blurhash: Option<String>,
}
