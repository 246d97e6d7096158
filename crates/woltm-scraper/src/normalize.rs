//! Normalization from raw platform records to [`woltm_core`] entities.
//!
//! Catalog items are handled separately in [`crate::extract`]; this module
//! covers cities and the discovery-stage market fields.

use chrono::{DateTime, Utc};
use woltm_core::products::minor_to_major;
use woltm_core::{City, DetailStatus, Market};

use crate::error::FetchError;
use crate::parse_helpers::non_blank;
use crate::types::{RawCity, RawVenue, RawVenueInfo, TagRef};

/// Normalizes a raw city record.
///
/// # Errors
///
/// Returns [`FetchError::MissingField`] when the id, the name, or a usable
/// `[lon, lat]` coordinate is absent.
pub fn normalize_city(raw: RawCity) -> Result<City, FetchError> {
    let id = raw.id.ok_or(FetchError::MissingField {
        entity: "city",
        field: "id",
    })?;
    let name = non_blank(raw.name).ok_or(FetchError::MissingField {
        entity: "city",
        field: "name",
    })?;
    let (longitude, latitude) = raw
        .location
        .and_then(|point| coordinate_pair(&point.coordinates))
        .ok_or(FetchError::MissingField {
            entity: "city",
            field: "location",
        })?;

    let slug = non_blank(raw.slug).unwrap_or_else(|| slugify(&name));

    Ok(City {
        id,
        name,
        slug,
        country: non_blank(raw.country_code_alpha3),
        latitude,
        longitude,
    })
}

/// Normalizes a venue stub from the retail listing into a [`Market`]
/// carrying discovery-stage fields only.
///
/// `page_city` is the city name reported by the retail page itself; it is
/// used when the venue omits its own.
///
/// # Errors
///
/// Returns [`FetchError::MissingField`] when the venue has no id or no slug
/// (without a slug the catalog cannot be fetched).
pub fn normalize_venue(
    raw: RawVenue,
    city: &City,
    page_city: Option<&str>,
    scraped_at: DateTime<Utc>,
) -> Result<Market, FetchError> {
    let id = raw.id.ok_or(FetchError::MissingField {
        entity: "venue",
        field: "id",
    })?;
    let slug = non_blank(raw.slug).ok_or(FetchError::MissingField {
        entity: "venue",
        field: "slug",
    })?;
    let name = non_blank(raw.name).unwrap_or_else(|| slug.clone());

    let (longitude, latitude) = coordinate_pair(&raw.location).unzip();
    let rating = raw.rating.unwrap_or_default();

    Ok(Market {
        id,
        name,
        slug,
        address: non_blank(raw.address),
        city: non_blank(raw.city)
            .or_else(|| non_blank(page_city.map(str::to_owned)))
            .unwrap_or_else(|| city.name.clone()),
        city_slug: city.slug.clone(),
        country: non_blank(raw.country).or_else(|| city.country.clone()),
        latitude,
        longitude,
        rating_score: rating.score.filter(|s| s.is_finite() && *s >= 0.0),
        rating_volume: rating.volume.and_then(|v| u64::try_from(v).ok()),
        price_range: raw.price_range.and_then(|v| u8::try_from(v).ok()),
        online: raw.online.unwrap_or(false),
        delivers: raw.delivers.unwrap_or(false),
        delivery_price: minor_to_major(raw.delivery_price_int.unwrap_or(0).max(0)),
        estimate_minutes: raw.estimate.and_then(|v| u32::try_from(v).ok()),
        estimate_range: non_blank(raw.estimate_range),
        description: non_blank(raw.short_description),
        tags: tag_labels(&raw.tags),
        detail_status: DetailStatus::Pending,
        scraped_at,
    })
}

/// Overwrites catalog-derived market fields from the venue-content payload.
///
/// Blank values leave the discovery-stage data in place.
pub fn apply_venue_info(market: &mut Market, info: &RawVenueInfo) {
    if let Some(description) = non_blank(info.description.clone())
        .or_else(|| non_blank(info.short_description.clone()))
    {
        market.description = Some(description);
    }
    let tags = tag_labels(&info.tags);
    if !tags.is_empty() {
        market.tags = tags;
    }
}

pub(crate) fn tag_labels(tags: &[TagRef]) -> Vec<String> {
    tags.iter().filter_map(TagRef::label).collect()
}

/// Reads a `[lon, lat]` pair, rejecting out-of-range or non-finite values.
fn coordinate_pair(coordinates: &[f64]) -> Option<(f64, f64)> {
    let [lon, lat, ..] = coordinates else {
        return None;
    };
    let valid = lon.is_finite()
        && lat.is_finite()
        && (-180.0..=180.0).contains(lon)
        && (-90.0..=90.0).contains(lat);
    valid.then_some((*lon, *lat))
}

/// `"Tbilisi Old Town"` → `"tbilisi-old-town"`.
fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            slug.push(c);
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
