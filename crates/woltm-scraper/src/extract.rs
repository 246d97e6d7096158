//! Flattening of a venue's nested catalog into item rows.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use woltm_core::products::minor_to_major;
use woltm_core::{Item, Market, PriceInfo};

use crate::normalize::tag_labels;
use crate::parse_helpers::non_blank;
use crate::types::{RawItem, RawSection, VenueContent};

const PATH_SEPARATOR: &str = " > ";

/// Items extracted from one venue plus what had to be dropped.
#[derive(Debug, Default)]
pub struct Extraction {
    pub items: Vec<Item>,
    /// Entries dropped because they carried no id.
    pub skipped: usize,
    /// `item_ids` references with no matching entry in the item table.
    pub unresolved_refs: usize,
}

/// Flattens `catalog` into one [`Item`] per leaf entry.
///
/// Sections are visited depth-first in payload order with an explicit
/// stack, so nesting depth is unbounded. Each item is tagged with the names
/// of the sections above it joined by `" > "`. Within a section, inline
/// items come before `item_ids` references.
///
/// An item listed in several sections is emitted once, under the first
/// path it was found at. Top-level items that no section reached are
/// emitted last with an empty path; for catalogs without sections that is
/// every item.
#[must_use]
pub fn extract_items(
    market: &Market,
    catalog: &VenueContent,
    scraped_at: DateTime<Utc>,
) -> Extraction {
    let table: HashMap<String, &RawItem> = catalog
        .items
        .iter()
        .filter_map(|item| item.id.clone().map(|id| (id, item)))
        .collect();

    let mut extraction = Extraction::default();
    let mut seen: HashSet<String> = HashSet::new();

    let mut stack: Vec<(&RawSection, String)> = catalog
        .sections
        .iter()
        .rev()
        .map(|section| (section, String::new()))
        .collect();

    while let Some((section, parent_path)) = stack.pop() {
        let path = match non_blank(section.name.clone()) {
            Some(name) if parent_path.is_empty() => name,
            Some(name) => format!("{parent_path}{PATH_SEPARATOR}{name}"),
            None => parent_path,
        };

        for raw in &section.items {
            emit(&mut extraction, &mut seen, market, raw, &path, scraped_at);
        }
        for id in &section.item_ids {
            match table.get(id) {
                Some(raw) => emit(&mut extraction, &mut seen, market, raw, &path, scraped_at),
                None => {
                    tracing::debug!(venue = %market.slug, item_id = %id, "unresolved item reference");
                    extraction.unresolved_refs += 1;
                }
            }
        }

        for child in section.children().rev() {
            stack.push((child, path.clone()));
        }
    }

    for raw in &catalog.items {
        if raw.id.as_ref().is_some_and(|id| seen.contains(id)) {
            continue;
        }
        emit(&mut extraction, &mut seen, market, raw, "", scraped_at);
    }

    if extraction.skipped > 0 {
        tracing::warn!(
            venue = %market.slug,
            skipped = extraction.skipped,
            "skipped catalog entries without an id"
        );
    }
    extraction
}

fn emit(
    extraction: &mut Extraction,
    seen: &mut HashSet<String>,
    market: &Market,
    raw: &RawItem,
    path: &str,
    scraped_at: DateTime<Utc>,
) {
    let Some(id) = raw.id.clone() else {
        tracing::debug!(
            venue = %market.slug,
            name = raw.name.as_deref().unwrap_or(""),
            "catalog entry has no id"
        );
        extraction.skipped += 1;
        return;
    };
    if !seen.insert(id.clone()) {
        return;
    }
    extraction
        .items
        .push(build_item(id, market, raw, path, scraped_at));
}

fn build_item(
    id: String,
    market: &Market,
    raw: &RawItem,
    path: &str,
    scraped_at: DateTime<Utc>,
) -> Item {
    let prices = PriceInfo::from_minor_units(raw.price, raw.original_price);
    let unit_price = raw.unit_price.as_ref();
    let first_image = raw.images.first();

    Item {
        id,
        venue_id: market.id.clone(),
        venue_name: market.name.clone(),
        venue_slug: market.slug.clone(),
        city: market.city.clone(),
        city_slug: market.city_slug.clone(),
        section_path: path.to_owned(),
        name: non_blank(raw.name.clone()).unwrap_or_default(),
        description: non_blank(raw.description.clone()),
        price: prices.price,
        original_price: prices.original_price,
        discount_amount: prices.discount_amount,
        discount_percentage: prices.discount_percentage,
        unit_info: non_blank(raw.unit_info.clone()),
        unit_price: unit_price
            .and_then(|u| u.price)
            .filter(|p| *p >= 0)
            .map(minor_to_major),
        unit_price_base: unit_price
            .and_then(|u| u.base)
            .filter(|b| b.is_finite() && *b >= 0.0),
        unit_price_unit: unit_price.and_then(|u| non_blank(u.unit.clone())),
        barcode_gtin: raw.barcode_gtin.clone(),
        image_urls: raw
            .images
            .iter()
            .filter_map(|image| non_blank(image.url.clone()))
            .collect(),
        image_blurhash: first_image.and_then(|image| non_blank(image.blurhash.clone())),
        is_available: raw.disabled_info.as_ref().is_none_or(serde_json::Value::is_null),
        quantity_left: non_negative(raw.quantity_left),
        purchasable_balance: non_negative(raw.purchasable_balance),
        min_quantity_per_purchase: non_negative(raw.min_quantity_per_purchase),
        max_quantity_per_purchase: non_negative(raw.max_quantity_per_purchase),
        alcohol_permille: raw
            .alcohol_permille
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or(0),
        vat_percentage: raw
            .vat_percentage
            .filter(|v| v.is_finite() && *v >= 0.0)
            .unwrap_or(0.0),
        dietary_preferences: tag_labels(&raw.dietary_preferences),
        tags: tag_labels(&raw.tags),
        is_plus_only: raw.is_wolt_plus_only.unwrap_or(false),
        deposit: raw.deposit.as_ref().and_then(deposit_minor).map(minor_to_major),
        scraped_at,
    }
}

fn non_negative(value: Option<i64>) -> Option<u64> {
    value.and_then(|v| u64::try_from(v).ok())
}

/// Deposit arrives as a bare minor-unit number or as an object carrying
/// `price` or `amount`.
fn deposit_minor(value: &serde_json::Value) -> Option<i64> {
    let amount = match value {
        serde_json::Value::Object(map) => map.get("price").or_else(|| map.get("amount"))?,
        other => other,
    };
    amount.as_i64().filter(|v| *v >= 0)
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
