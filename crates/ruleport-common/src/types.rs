use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// An old-style detection rule ("anomaly function").
///
/// Most tuning knobs live in `properties`, a `key=value;key=value` bag whose
/// meaning depends on `function_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyFunction {
    pub id: i64,
    pub function_name: String,
    pub active: bool,
    pub metric: String,
    /// Dataset the metric belongs to.
    pub collection: String,
    /// Rule-type tag, e.g. `WEEK_OVER_WEEK_RULE` or `MIN_MAX_THRESHOLD`.
    pub function_type: String,
    pub properties: String,
    pub bucket_size: i32,
    pub bucket_unit: String,
    pub window_size: i32,
    pub window_unit: String,
    pub window_delay: i32,
    pub window_delay_unit: String,
    pub explore_dimensions: Option<String>,
    /// Dimension filters in `dim=value;dim=value` form.
    pub filters: Option<String>,
    #[serde(default)]
    pub data_filter: BTreeMap<String, String>,
    #[serde(default)]
    pub alert_filter: BTreeMap<String, String>,
    pub merge_config: Option<MergeConfig>,
    pub global_metric: Option<String>,
    pub global_metric_filters: Option<String>,
    pub created_by: Option<String>,
    /// Target detection config id once migrated.
    pub migrated_to: Option<i64>,
}

/// How a legacy function merged consecutive anomalies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeConfig {
    pub strategy: MergeStrategy,
    /// Maximum gap between two anomalies that still merges them (ms).
    pub max_gap_ms: i64,
    /// Maximum length of a merged anomaly (ms).
    pub max_duration_ms: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MergeStrategy {
    Function,
    FunctionDimensions,
}

impl std::fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MergeStrategy::Function => write!(f, "FUNCTION"),
            MergeStrategy::FunctionDimensions => write!(f, "FUNCTION_DIMENSIONS"),
        }
    }
}

impl std::str::FromStr for MergeStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "FUNCTION" => Ok(MergeStrategy::Function),
            "FUNCTION_DIMENSIONS" => Ok(MergeStrategy::FunctionDimensions),
            _ => Err(format!("unknown merge strategy: {s}")),
        }
    }
}

/// Recipient lists of a legacy alert. Missing lists deserialize as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recipients {
    #[serde(default)]
    pub to: Vec<String>,
    #[serde(default)]
    pub cc: Vec<String>,
    #[serde(default)]
    pub bcc: Vec<String>,
}

/// An old-style subscription group ("alert config").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyAlert {
    pub id: i64,
    pub name: String,
    pub active: bool,
    pub application: String,
    pub cron_expression: String,
    pub subject_type: String,
    pub from_address: String,
    pub recipients: Recipients,
    /// Ids of the legacy functions this alert notifies on.
    pub function_ids: Vec<i64>,
    pub created_by: Option<String>,
    pub migrated_to: Option<i64>,
}

/// A new-schema detection config produced by migration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfig {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub active: bool,
    /// Rule pipeline document rendered as YAML.
    pub yaml: String,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Detection config as produced by a document builder, before it has an id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDetectionConfig {
    pub name: String,
    pub description: String,
    pub active: bool,
    pub yaml: String,
}

/// A new-schema subscription (alert) config produced by migration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionConfig {
    pub id: i64,
    pub name: String,
    pub application: String,
    pub active: bool,
    pub cron: String,
    pub yaml: String,
    pub detection_names: Vec<String>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSubscriptionConfig {
    pub name: String,
    pub application: String,
    pub active: bool,
    pub cron: String,
    pub yaml: String,
    pub detection_names: Vec<String>,
}

/// A past anomaly event. Owned by a legacy function until its function is
/// migrated, then by the detection config that replaced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalResult {
    pub id: i64,
    pub function_id: Option<i64>,
    pub detection_config_id: Option<i64>,
    pub metric: String,
    pub collection: String,
    pub start_time: i64,
    pub end_time: i64,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub id: i64,
    pub dataset: String,
    pub timezone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricConfig {
    pub id: i64,
    pub name: String,
    pub dataset: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_strategy_parses_legacy_spelling() {
        let s: MergeStrategy = "FUNCTION_DIMENSIONS".parse().unwrap();
        assert_eq!(s, MergeStrategy::FunctionDimensions);
        assert_eq!(s.to_string(), "FUNCTION_DIMENSIONS");
        assert!("BY_TIME".parse::<MergeStrategy>().is_err());
    }

    #[test]
    fn recipients_default_missing_lists_to_empty() {
        let r: Recipients = serde_json::from_str(r#"{"to":["a@example.com"]}"#).unwrap();
        assert_eq!(r.to, vec!["a@example.com".to_string()]);
        assert!(r.cc.is_empty());
        assert!(r.bcc.is_empty());
    }
}
