//! CSV output tables.
//!
//! One row per market and one row per item, each with a header row that is
//! present even when the table is empty. List fields are joined with `,`
//! inside a single (quoted) cell.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Serialize;
use woltm_core::{Item, Market};
use woltm_scraper::CrawlSink;

/// Column order of the market table; matches the fields of `MarketRow`.
const MARKET_COLUMNS: [&str; 21] = [
    "id",
    "name",
    "slug",
    "address",
    "city",
    "city_slug",
    "country",
    "latitude",
    "longitude",
    "rating_score",
    "rating_volume",
    "price_range",
    "online",
    "delivers",
    "delivery_price",
    "estimate_minutes",
    "estimate_range",
    "description",
    "tags",
    "detail_status",
    "scraped_at",
];

/// Column order of the item table; matches the fields of `ItemRow`.
const ITEM_COLUMNS: [&str; 33] = [
    "id",
    "venue_id",
    "venue_name",
    "venue_slug",
    "city",
    "city_slug",
    "section_path",
    "name",
    "description",
    "price",
    "original_price",
    "discount_amount",
    "discount_percentage",
    "is_discounted",
    "unit_info",
    "unit_price",
    "unit_price_base",
    "unit_price_unit",
    "barcode_gtin",
    "image_urls",
    "image_blurhash",
    "is_available",
    "quantity_left",
    "purchasable_balance",
    "min_quantity_per_purchase",
    "max_quantity_per_purchase",
    "alcohol_permille",
    "vat_percentage",
    "dietary_preferences",
    "tags",
    "is_plus_only",
    "deposit",
    "scraped_at",
];

/// Writes the market and item tables incrementally.
///
/// Both files are created up front with their header rows, so a run that
/// produces no markets or items still leaves well-formed tables. Dropping
/// the sink flushes it.
pub(crate) struct CsvSink {
    markets: csv::Writer<File>,
    items: csv::Writer<File>,
    markets_path: PathBuf,
    items_path: PathBuf,
}

impl CsvSink {
    /// Creates `markets{suffix}.csv` and `items{suffix}.csv` in `dir`,
    /// truncating existing files.
    ///
    /// # Errors
    ///
    /// Returns an error if either file cannot be created.
    pub(crate) fn create(dir: &Path, suffix: &str) -> anyhow::Result<Self> {
        let markets_path = dir.join(format!("markets{suffix}.csv"));
        let items_path = dir.join(format!("items{suffix}.csv"));
        let markets = table_writer(&markets_path, &MARKET_COLUMNS)?;
        let items = table_writer(&items_path, &ITEM_COLUMNS)?;
        Ok(Self {
            markets,
            items,
            markets_path,
            items_path,
        })
    }

    pub(crate) fn markets_path(&self) -> &Path {
        &self.markets_path
    }

    pub(crate) fn items_path(&self) -> &Path {
        &self.items_path
    }

    /// Flushes both tables.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from the underlying files.
    pub(crate) fn finish(&mut self) -> io::Result<()> {
        self.flush()
    }
}

/// Opens `path` with the header row already written. Records are
/// serialized without headers so the row structs never emit a second one.
fn table_writer(path: &Path, columns: &[&str]) -> anyhow::Result<csv::Writer<File>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    writer
        .write_record(columns)
        .with_context(|| format!("failed to write header of {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("failed to write header of {}", path.display()))?;
    Ok(writer)
}

impl CrawlSink for CsvSink {
    fn write_market(&mut self, market: &Market) -> io::Result<()> {
        self.markets.serialize(MarketRow::from(market))?;
        Ok(())
    }

    fn write_items(&mut self, items: &[Item]) -> io::Result<()> {
        for item in items {
            self.items.serialize(ItemRow::from(item))?;
        }
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.markets.flush()?;
        self.items.flush()
    }
}

impl Drop for CsvSink {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            tracing::error!(error = %e, "failed to flush output tables on drop");
        }
    }
}

#[derive(Debug, Serialize)]
struct MarketRow<'a> {
    id: &'a str,
    name: &'a str,
    slug: &'a str,
    address: Option<&'a str>,
    city: &'a str,
    city_slug: &'a str,
    country: Option<&'a str>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    rating_score: Option<f64>,
    rating_volume: Option<u64>,
    price_range: Option<u8>,
    online: bool,
    delivers: bool,
    delivery_price: f64,
    estimate_minutes: Option<u32>,
    estimate_range: Option<&'a str>,
    description: Option<&'a str>,
    tags: String,
    detail_status: String,
    scraped_at: String,
}

impl<'a> From<&'a Market> for MarketRow<'a> {
    fn from(m: &'a Market) -> Self {
        Self {
            id: &m.id,
            name: &m.name,
            slug: &m.slug,
            address: m.address.as_deref(),
            city: &m.city,
            city_slug: &m.city_slug,
            country: m.country.as_deref(),
            latitude: m.latitude,
            longitude: m.longitude,
            rating_score: m.rating_score,
            rating_volume: m.rating_volume,
            price_range: m.price_range,
            online: m.online,
            delivers: m.delivers,
            delivery_price: m.delivery_price,
            estimate_minutes: m.estimate_minutes,
            estimate_range: m.estimate_range.as_deref(),
            description: m.description.as_deref(),
            tags: m.tags.join(","),
            detail_status: m.detail_status.to_string(),
            scraped_at: m.scraped_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ItemRow<'a> {
    id: &'a str,
    venue_id: &'a str,
    venue_name: &'a str,
    venue_slug: &'a str,
    city: &'a str,
    city_slug: &'a str,
    section_path: &'a str,
    name: &'a str,
    description: Option<&'a str>,
    price: f64,
    original_price: f64,
    discount_amount: f64,
    discount_percentage: f64,
    is_discounted: bool,
    unit_info: Option<&'a str>,
    unit_price: Option<f64>,
    unit_price_base: Option<f64>,
    unit_price_unit: Option<&'a str>,
    barcode_gtin: Option<&'a str>,
    image_urls: String,
    image_blurhash: Option<&'a str>,
    is_available: bool,
    quantity_left: Option<u64>,
    purchasable_balance: Option<u64>,
    min_quantity_per_purchase: Option<u64>,
    max_quantity_per_purchase: Option<u64>,
    alcohol_permille: u32,
    vat_percentage: f64,
    dietary_preferences: String,
    tags: String,
    is_plus_only: bool,
    deposit: Option<f64>,
    scraped_at: String,
}

impl<'a> From<&'a Item> for ItemRow<'a> {
    fn from(i: &'a Item) -> Self {
        Self {
            id: &i.id,
            venue_id: &i.venue_id,
            venue_name: &i.venue_name,
            venue_slug: &i.venue_slug,
            city: &i.city,
            city_slug: &i.city_slug,
            section_path: &i.section_path,
            name: &i.name,
            description: i.description.as_deref(),
            price: i.price,
            original_price: i.original_price,
            discount_amount: i.discount_amount,
            discount_percentage: i.discount_percentage,
            is_discounted: i.is_discounted(),
            unit_info: i.unit_info.as_deref(),
            unit_price: i.unit_price,
            unit_price_base: i.unit_price_base,
            unit_price_unit: i.unit_price_unit.as_deref(),
            barcode_gtin: i.barcode_gtin.as_deref(),
            image_urls: i.image_urls.join(","),
            image_blurhash: i.image_blurhash.as_deref(),
            is_available: i.is_available,
            quantity_left: i.quantity_left,
            purchasable_balance: i.purchasable_balance,
            min_quantity_per_purchase: i.min_quantity_per_purchase,
            max_quantity_per_purchase: i.max_quantity_per_purchase,
            alcohol_permille: i.alcohol_permille,
            vat_percentage: i.vat_percentage,
            dietary_preferences: i.dietary_preferences.join(","),
            tags: i.tags.join(","),
            is_plus_only: i.is_plus_only,
            deposit: i.deposit,
            scraped_at: i.scraped_at.to_rfc3339(),
        }
    }
}

#[cfg(test)]
#[path = "output_test.rs"]
mod tests;
