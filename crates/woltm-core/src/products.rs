use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A product listed in a market's catalog, flattened to one row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    /// ID of the [`crate::Market`] this item was extracted from.
    pub venue_id: String,
    pub venue_name: String,
    pub venue_slug: String,
    pub city: String,
    pub city_slug: String,
    /// Section names from the catalog root to the item, joined with `" > "`.
    pub section_path: String,
    pub name: String,
    pub description: Option<String>,
    /// Current selling price in major currency units.
    pub price: f64,
    /// Pre-discount price in major units; equals `price` when not discounted.
    pub original_price: f64,
    pub discount_amount: f64,
    /// Discount as a percentage of `original_price`, rounded to two decimals.
    pub discount_percentage: f64,
    /// Free-text unit label, e.g. `"1 l"` or `"500 g"`.
    pub unit_info: Option<String>,
    pub unit_price: Option<f64>,
    pub unit_price_base: Option<f64>,
    pub unit_price_unit: Option<String>,
    pub barcode_gtin: Option<String>,
    pub image_urls: Vec<String>,
    pub image_blurhash: Option<String>,
    pub is_available: bool,
    pub quantity_left: Option<u64>,
    pub purchasable_balance: Option<u64>,
    pub min_quantity_per_purchase: Option<u64>,
    pub max_quantity_per_purchase: Option<u64>,
    pub alcohol_permille: u32,
    pub vat_percentage: f64,
    pub dietary_preferences: Vec<String>,
    pub tags: Vec<String>,
    pub is_plus_only: bool,
    /// Bottle/can deposit in major units, when the platform charges one.
    pub deposit: Option<f64>,
    pub scraped_at: DateTime<Utc>,
}

impl Item {
    #[must_use]
    pub fn is_discounted(&self) -> bool {
        self.discount_amount > 0.0
    }
}

/// Current/original price pair with derived discount fields.
///
/// Built from minor-unit integers (the platform sends cents) so the
/// discount amount is exact before conversion to major units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceInfo {
    pub price: f64,
    pub original_price: f64,
    pub discount_amount: f64,
    pub discount_percentage: f64,
}

impl PriceInfo {
    /// Derives prices and discount from optional minor-unit values.
    ///
    /// Missing or negative values count as absent. When only one price is
    /// present the other takes its value and no discount is recorded; when
    /// both are absent every field is zero. A discount is recorded only when
    /// `original > current`.
    #[must_use]
    pub fn from_minor_units(current: Option<i64>, original: Option<i64>) -> Self {
        let current = current.filter(|v| *v >= 0);
        let original = original.filter(|v| *v >= 0);

        let (current, original) = match (current, original) {
            (Some(c), Some(o)) => (c, o),
            (Some(c), None) => (c, c),
            (None, Some(o)) => (o, o),
            (None, None) => (0, 0),
        };

        let discount_minor = if original > current {
            original - current
        } else {
            0
        };

        #[allow(clippy::cast_precision_loss)]
        let discount_percentage = if discount_minor > 0 {
            let ratio = discount_minor as f64 / original as f64;
            (ratio * 10_000.0).round() / 100.0
        } else {
            0.0
        };

        Self {
            price: minor_to_major(current),
            original_price: minor_to_major(original),
            discount_amount: minor_to_major(discount_minor),
            discount_percentage,
        }
    }
}

/// Converts a minor-unit amount (cents) to major units.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn minor_to_major(minor: i64) -> f64 {
    minor as f64 / 100.0
}
