//! Serde helpers for tolerant decoding of platform payloads.
//!
//! The catalog API is undocumented and field shapes drift between venues
//! and API versions. These helpers let one malformed field degrade to its
//! default instead of failing the whole record.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Reads an identifier that may arrive as a string, a number, or a Mongo
/// style `{"$oid": "..."}` object. Blank strings and other shapes are absent.
pub(crate) fn flexible_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(id_from_value))
}

pub(crate) fn id_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => map.get("$oid").and_then(id_from_value),
        _ => None,
    }
}

/// Decodes `T`, falling back to `T::default()` when the field has an
/// unexpected shape.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Decodes a sequence element by element, dropping elements that do not
/// decode as `T`. A non-array value yields an empty vector.
pub(crate) fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(elements) = value else {
        return Ok(Vec::new());
    };
    Ok(elements
        .into_iter()
        .filter_map(|element| {
            serde_json::from_value::<T>(element)
                .map_err(|e| {
                    tracing::debug!(error = %e, "dropping malformed sequence element");
                })
                .ok()
        })
        .collect())
}

/// Reads a list of ids that may be strings or numbers, dropping anything else.
pub(crate) fn flexible_id_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(elements) = value else {
        return Ok(Vec::new());
    };
    Ok(elements.iter().filter_map(id_from_value).collect())
}

/// Blank strings carry no information in the output tables.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Decodes a response envelope, requiring a JSON object that carries at
/// least one of `keys` (any key when `keys` is empty).
///
/// Envelope types default every field, so without this check `[]` or `{}`
/// would decode as an empty but successful response.
pub(crate) fn decode_envelope<T>(body: Value, keys: &[&str]) -> Result<T, serde_json::Error>
where
    T: DeserializeOwned,
{
    let Value::Object(map) = &body else {
        return Err(serde::de::Error::custom(format!(
            "expected a JSON object, found {}",
            kind_of(&body)
        )));
    };
    if !keys.is_empty() && !keys.iter().any(|key| map.contains_key(*key)) {
        return Err(serde::de::Error::custom(format!(
            "expected one of the keys {keys:?}"
        )));
    }
    serde_json::from_value(body)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
