//! Standard helper namespace
//!
//! Generators and formatters commonly needed when building URLs and report
//! links. Generators produce a fresh value on every call.

use base64::Engine;
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDate, SecondsFormat, TimeDelta, Utc};
use rand::Rng;
use uuid::Uuid;

use varex_domain::ScriptValue;

use super::registry::HelperRegistry;

/// Builds the standard helper namespace.
///
/// | Helper | Result |
/// |---|---|
/// | `uuid()` | random UUID v4 |
/// | `timestamp()` | Unix time in seconds |
/// | `isoTimestamp()` | current UTC time, RFC 3339 |
/// | `date()` | current UTC date, `YYYY-MM-DD` |
/// | `formatDate(date, format)` | `date` rendered with a strftime format |
/// | `addDays(date, n)` | `YYYY-MM-DD` date `n` days later |
/// | `randomInt(min = 0, max = 1000)` | random integer in `[min, max]` |
/// | `base64(text)` | standard Base64 of the UTF-8 bytes |
/// | `joinUrl(base, path)` | `base` and `path` joined by exactly one `/` |
#[must_use]
pub fn standard_helpers() -> HelperRegistry {
    HelperRegistry::new()
        .with_function("uuid", |_| Ok(ScriptValue::String(Uuid::new_v4().to_string())))
        .with_function("timestamp", |_| {
            Ok(ScriptValue::Number(Utc::now().timestamp() as f64))
        })
        .with_function("isoTimestamp", |_| {
            Ok(ScriptValue::String(
                Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            ))
        })
        .with_function("date", |_| {
            Ok(ScriptValue::String(Utc::now().format("%Y-%m-%d").to_string()))
        })
        .with_function("formatDate", |args| {
            let date = parse_date_time(&text(args, 0))?;
            let format = text(args, 1);
            if StrftimeItems::new(&format).any(|item| matches!(item, Item::Error)) {
                return Err(format!("RangeError: Invalid date format '{format}'"));
            }
            Ok(ScriptValue::String(date.format(&format).to_string()))
        })
        .with_function("addDays", |args| {
            let date = parse_date(&text(args, 0))?;
            let days = number(args, 1).trunc() as i64;
            let shifted = TimeDelta::try_days(days)
                .and_then(|delta| date.checked_add_signed(delta))
                .ok_or_else(|| "RangeError: Invalid time value".to_string())?;
            Ok(ScriptValue::String(shifted.format("%Y-%m-%d").to_string()))
        })
        .with_function("randomInt", |args| {
            let min = optional_number(args, 0).unwrap_or(0.0).trunc() as i64;
            let max = optional_number(args, 1).unwrap_or(1000.0).trunc() as i64;
            if min > max {
                return Err(format!("RangeError: randomInt min {min} exceeds max {max}"));
            }
            let value = rand::rng().random_range(min..=max);
            Ok(ScriptValue::Number(value as f64))
        })
        .with_function("base64", |args| {
            Ok(ScriptValue::String(
                base64::engine::general_purpose::STANDARD.encode(text(args, 0)),
            ))
        })
        .with_function("joinUrl", |args| {
            let base = text(args, 0);
            url::Url::parse(&base).map_err(|e| format!("TypeError: Invalid URL '{base}': {e}"))?;
            let path = text(args, 1);
            Ok(ScriptValue::String(format!(
                "{}/{}",
                base.trim_end_matches('/'),
                path.trim_start_matches('/')
            )))
        })
}

fn text(args: &[ScriptValue], index: usize) -> String {
    args.get(index)
        .map(ScriptValue::to_display_string)
        .unwrap_or_default()
}

fn number(args: &[ScriptValue], index: usize) -> f64 {
    let n = args.get(index).map_or(0.0, ScriptValue::to_number);
    if n.is_nan() { 0.0 } else { n }
}

fn optional_number(args: &[ScriptValue], index: usize) -> Option<f64> {
    args.get(index)
        .filter(|value| !value.is_nullish())
        .map(ScriptValue::to_number)
        .filter(|n| !n.is_nan())
}

/// Accepts RFC 3339 timestamps and plain `YYYY-MM-DD` dates (midnight UTC).
fn parse_date_time(input: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(date_time) = DateTime::parse_from_rfc3339(input) {
        return Ok(date_time.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("RangeError: Invalid time value '{input}'"))
}

fn parse_date(input: &str) -> Result<NaiveDate, String> {
    parse_date_time(input).map(|date_time| date_time.date_naive())
}
