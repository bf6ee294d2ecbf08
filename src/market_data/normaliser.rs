// Normalize wire payloads into canonical shapes.
// The provider spells the same field several ways depending on endpoint and
// instrument; all known aliases are enumerated here and nowhere else. Every
// function returns None when no alias matches, which the selector treats the
// same as a failed fetch.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

use crate::engine::types::{Candle, Mover, NewsItem};

const PRICE_KEYS: &[&str] = &["price", "current_price", "ltp", "last_price"];
const CHANGE_KEYS: &[&str] = &["change_percent", "chg_percent", "chgPct"];
const TIME_KEYS: &[&str] = &["time", "timestamp", "date"];

/// First numeric value found under any of `keys`. Numbers may arrive as
/// JSON numbers or as decimal strings.
pub fn number(payload: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|k| payload.get(*k).and_then(as_f64))
}

pub fn price(payload: &Value) -> Option<f64> {
    number(payload, PRICE_KEYS)
}

pub fn change_percent(payload: &Value) -> Option<f64> {
    number(payload, CHANGE_KEYS)
}

/// Rows of a list payload: either a bare array or an object with the rows
/// under "data".
pub fn rows(payload: &Value) -> Option<&Vec<Value>> {
    match payload {
        Value::Array(items) => Some(items),
        Value::Object(_) => payload.get("data")?.as_array(),
        _ => None,
    }
}

/// Unix-seconds timestamp from any known time field. String values are tried
/// as RFC 3339, then as a bare date.
pub fn timestamp(payload: &Value) -> Option<i64> {
    for key in TIME_KEYS {
        let Some(v) = payload.get(*key) else { continue };
        if let Some(n) = v.as_i64() {
            return Some(n);
        }
        if let Some(s) = v.as_str() {
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.timestamp());
            }
            if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                return d
                    .and_hms_opt(0, 0, 0)
                    .map(|dt| dt.and_utc().timestamp());
            }
        }
    }
    None
}

/// One candle from a history row. Rows missing a usable time or any of the
/// four prices are dropped rather than defaulted.
pub fn candle(row: &Value) -> Option<Candle> {
    let time = timestamp(row)?;
    Some(Candle {
        time,
        open: row.get("open").and_then(as_f64)?,
        high: row.get("high").and_then(as_f64)?,
        low: row.get("low").and_then(as_f64)?,
        close: row.get("close").and_then(as_f64)?,
        volume: row.get("volume").and_then(as_u64).unwrap_or(0),
    })
}

/// One trending row. Needs at least a symbol and a price.
pub fn mover(row: &Value) -> Option<Mover> {
    let symbol = row
        .get("symbol")
        .or_else(|| row.get("name"))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())?
        .to_string();
    Some(Mover {
        symbol,
        price: price(row)?,
        change_percent: change_percent(row).unwrap_or(0.0),
        volume: row.get("volume").and_then(as_u64).unwrap_or(0),
    })
}

/// One news row. Missing fields get neutral defaults since a headline-only
/// item is still presentable.
pub fn news_item(row: &Value) -> Option<NewsItem> {
    if !row.is_object() {
        return None;
    }
    let text = |keys: &[&str]| {
        keys.iter()
            .find_map(|k| row.get(*k).and_then(Value::as_str))
            .map(str::to_string)
    };
    Some(NewsItem {
        title: text(&["title", "headline"]).unwrap_or_else(|| "Market Update".to_string()),
        summary: text(&["summary", "description"])
            .unwrap_or_else(|| "Market news update".to_string()),
        timestamp: text(&["timestamp", "date"]).unwrap_or_else(|| Utc::now().to_rfc3339()),
        source: text(&["source"]).unwrap_or_else(|| "Indian Stock API".to_string()),
    })
}

fn as_f64(v: &Value) -> Option<f64> {
    v.as_f64().or_else(|| v.as_str()?.trim().parse().ok())
}

fn as_u64(v: &Value) -> Option<u64> {
    v.as_u64()
        .or_else(|| v.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
        .or_else(|| v.as_str()?.trim().parse().ok())
}
