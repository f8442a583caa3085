//! Forgiving field decoders for upstream JSON.
//!
//! OpenFEMA rows occasionally carry nulls, numbers where strings are
//! expected, or timestamps where dates are expected. A bad field falls back
//! to its default instead of failing the whole row.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serializer};
use serde_json::Value;

use super::Money;

/// Any scalar rendered as a string; null becomes empty.
pub fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    })
}

/// Integers from numbers or numeric strings; anything else becomes 0.
pub fn int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .unwrap_or_default(),
        Some(Value::String(s)) => s.trim().parse().unwrap_or_default(),
        _ => 0,
    })
}

/// Dollar amount from a number or numeric string; anything unreadable or
/// out of range becomes zero.
pub fn money<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(|v| v.checked_mul(100))
            .map(Money::from_cents)
            .or_else(|| n.as_f64().and_then(Money::from_dollars_f64))
            .unwrap_or_default(),
        Some(Value::String(s)) => s.parse().unwrap_or_default(),
        _ => Money::ZERO,
    })
}

/// Calendar date from `YYYY-MM-DD` or an RFC 3339 timestamp.
pub fn date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => parse_date(&s),
        _ => None,
    })
}

/// Serialize an optional date as `YYYY-MM-DD`, or an empty string.
pub fn serialize_date<S: Serializer>(
    value: &Option<NaiveDate>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(d) => serializer.collect_str(&d.format(DATE_FORMAT)),
        None => serializer.serialize_str(""),
    }
}

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Lenient date parse shared by the JSON decoder and the CSV reader.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, DATE_FORMAT) {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    // "2021-03-04T00:00:00" without an offset, or any other trailing time
    s.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, DATE_FORMAT).ok())
}
