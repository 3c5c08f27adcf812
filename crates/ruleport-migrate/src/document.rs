//! Ordered documents and the legacy string formats they are built from.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::str::FromStr;

use crate::error::{MigrationError, Result};

/// Insertion-ordered key/value tree describing one target config.
pub type Document = Map<String, Value>;

/// Renders a document as block-style YAML, keeping key order.
pub fn to_yaml(document: &Document) -> std::result::Result<String, serde_yaml::Error> {
    serde_yaml::to_string(document)
}

/// Parses a legacy `key=value;key=value` property bag.
///
/// Entries may also be separated by newlines. An entry without `=` is kept
/// with an empty value. Later duplicates win.
pub fn parse_properties(raw: &str) -> BTreeMap<String, String> {
    let mut properties = BTreeMap::new();
    for entry in raw.split([';', '\n']) {
        let entry = entry.trim();
        if entry.is_empty() || entry.starts_with('#') {
            continue;
        }
        let (key, value) = entry.split_once('=').unwrap_or((entry, ""));
        properties.insert(key.trim().to_string(), value.trim().to_string());
    }
    properties
}

/// Parses a legacy `dim=value;dim=value2` filter string into a map of
/// dimension to values. Values keep their declaration order.
pub fn parse_dimension_filters(raw: &str) -> BTreeMap<String, Vec<String>> {
    let mut filters: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for entry in raw.split(';') {
        let Some((dimension, value)) = entry.split_once('=') else {
            continue;
        };
        let (dimension, value) = (dimension.trim(), value.trim());
        if dimension.is_empty() {
            continue;
        }
        let values = filters.entry(dimension.to_string()).or_default();
        if !values.iter().any(|v| v == value) {
            values.push(value.to_string());
        }
    }
    filters
}

pub(crate) fn filters_value(filters: BTreeMap<String, Vec<String>>) -> Value {
    let mut out = Map::new();
    for (dimension, values) in filters {
        out.insert(
            dimension,
            Value::Array(values.into_iter().map(Value::String).collect()),
        );
    }
    Value::Object(out)
}

/// Time unit names used by legacy bucket and window settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    pub fn millis(self) -> i64 {
        match self {
            TimeUnit::Milliseconds => 1,
            TimeUnit::Seconds => 1_000,
            TimeUnit::Minutes => 60_000,
            TimeUnit::Hours => 3_600_000,
            TimeUnit::Days => 86_400_000,
        }
    }
}

impl FromStr for TimeUnit {
    type Err = MigrationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MILLISECONDS" => Ok(TimeUnit::Milliseconds),
            "SECONDS" => Ok(TimeUnit::Seconds),
            "MINUTES" => Ok(TimeUnit::Minutes),
            "HOURS" => Ok(TimeUnit::Hours),
            "DAYS" => Ok(TimeUnit::Days),
            other => Err(MigrationError::Translation(format!(
                "unknown time unit '{other}'"
            ))),
        }
    }
}

/// Formats a millisecond span as an ISO-8601 duration using hours,
/// minutes and seconds only.
///
/// # Examples
///
/// ```
/// use ruleport_migrate::document::iso_period;
///
/// assert_eq!(iso_period(5 * 60_000), "PT5M");
/// assert_eq!(iso_period(86_400_000), "PT24H");
/// assert_eq!(iso_period(90_500), "PT1M30.500S");
/// ```
pub fn iso_period(millis: i64) -> String {
    let hours = millis / 3_600_000;
    let minutes = millis % 3_600_000 / 60_000;
    let seconds = millis % 60_000 / 1_000;
    let fraction = millis % 1_000;

    let mut out = String::from("PT");
    if hours != 0 {
        let _ = write!(out, "{hours}H");
    }
    if minutes != 0 {
        let _ = write!(out, "{minutes}M");
    }
    if fraction != 0 {
        let _ = write!(out, "{seconds}.{fraction:03}S");
    } else if seconds != 0 {
        let _ = write!(out, "{seconds}S");
    }
    if out.len() == 2 {
        out.push_str("0S");
    }
    out
}

/// Bucket period of a legacy function, e.g. `PT1H` for one `HOURS` bucket.
pub fn bucket_period(size: i32, unit: &str) -> Result<String> {
    if size <= 0 {
        return Err(MigrationError::Translation(format!(
            "bucket size must be positive, got {size}"
        )));
    }
    let unit: TimeUnit = unit.parse()?;
    Ok(iso_period(i64::from(size) * unit.millis()))
}
