//! Lenient field decoding applied once, at the request boundary.
//!
//! Forms arrive either as JSON bodies or as multipart text parts, so the
//! same field may be an array, a JSON-encoded array, or a bare scalar.
//! These helpers collapse every shape into the typed value the domain
//! expects. List fields never fail: anything unusable becomes `[]`.

use chrono::{DateTime, NaiveDate};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Coerce any JSON value into a flat list of strings.
pub fn coerce_flat_list(value: Value) -> Vec<String> {
    match value {
        Value::Null | Value::Object(_) => Vec::new(),
        Value::Array(items) => items.into_iter().flat_map(coerce_flat_list).collect(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Vec::new();
            }
            if trimmed.starts_with('[') {
                if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(trimmed) {
                    return items.into_iter().flat_map(coerce_flat_list).collect();
                }
            }
            vec![trimmed.to_string()]
        }
        Value::Number(n) => vec![n.to_string()],
        Value::Bool(b) => vec![b.to_string()],
    }
}

/// Coerce a JSON value (or JSON-encoded string) into a list of objects.
///
/// A single object is treated as a one-element list.
pub fn coerce_object_list<T: DeserializeOwned>(value: Value) -> Vec<T> {
    let value = match value {
        Value::String(s) if s.trim().is_empty() => return Vec::new(),
        Value::String(s) => match serde_json::from_str::<Value>(&s) {
            Ok(decoded) => decoded,
            Err(_) => return Vec::new(),
        },
        other => other,
    };

    match value {
        Value::Array(_) => serde_json::from_value(value).unwrap_or_default(),
        Value::Object(_) => serde_json::from_value(value)
            .map(|item| vec![item])
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

/// Coerce a scalar into a trimmed string; blank becomes `None`.
pub fn coerce_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => items.into_iter().find_map(coerce_string),
        Value::Null | Value::Object(_) => None,
    }
}

/// Parse a calendar date from `YYYY-MM-DD` or an RFC 3339 timestamp.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

pub fn flat_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(coerce_flat_list)
}

pub fn object_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Value::deserialize(deserializer).map(coerce_object_list)
}

pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(coerce_string)
}

pub fn opt_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(b)),
        Value::Number(n) => Ok(Some(n.as_i64().unwrap_or(0) != 0)),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "" => Ok(None),
            "true" | "1" | "yes" => Ok(Some(true)),
            "false" | "0" | "no" => Ok(Some(false)),
            other => Err(D::Error::custom(format!("invalid boolean '{}'", other))),
        },
        other => Err(D::Error::custom(format!("invalid boolean {}", other))),
    }
}

pub fn opt_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match coerce_string(Value::deserialize(deserializer)?) {
        None => Ok(None),
        Some(raw) => parse_date(&raw)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid date '{}'", raw))),
    }
}
