//! Maps legacy functions and alerts onto ordered target documents.
//!
//! Everything here is pure. Store lookups the output depends on (the
//! dataset timezone, the names of referenced functions) are resolved by the
//! caller and passed in.

use ruleport_common::types::{LegacyAlert, LegacyFunction, MergeStrategy};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

use crate::document::{bucket_period, filters_value, parse_dimension_filters, parse_properties, Document};
use crate::error::{MigrationError, Result};

pub const DESCRIPTION_PLACEHOLDER: &str = "<Please edit and provide a description for this alert>";
pub const PIPELINE_TYPE: &str = "Composite";
pub const ALERTER_PIPELINE_TYPE: &str = "DEFAULT_ALERTER_PIPELINE";
pub const DETECTION_RULE_NAME: &str = "detection_rule1";
pub const FILTER_RULE_NAME: &str = "filter_rule1";

pub const PERCENTAGE_RULE: &str = "PERCENTAGE_RULE";
pub const THRESHOLD_RULE: &str = "THRESHOLD";
pub const MIGRATED_ALGORITHM: &str = "MIGRATED_ALGORITHM";
pub const MIGRATED_ALGORITHM_FILTER: &str = "MIGRATED_ALGORITHM_FILTER";
pub const SITEWIDE_IMPACT_FILTER: &str = "SITEWIDE_IMPACT_FILTER";
pub const PERCENTAGE_CHANGE_FILTER: &str = "PERCENTAGE_CHANGE_FILTER";

const UP_OR_DOWN: &str = "up_or_down";

/// Dataset facts a translation depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetContext {
    pub timezone: String,
}

impl Default for DatasetContext {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
        }
    }
}

/// Detection rule family, chosen from the legacy rule-type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionKind {
    WeekOverWeek,
    MinMaxThreshold,
    Algorithm,
}

impl DetectionKind {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "WEEK_OVER_WEEK_RULE" => DetectionKind::WeekOverWeek,
            "MIN_MAX_THRESHOLD" => DetectionKind::MinMaxThreshold,
            _ => DetectionKind::Algorithm,
        }
    }
}

/// Filter rule family, chosen from the legacy alert-filter map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Algorithm,
    SitewideImpact,
    PercentageChange,
}

impl FilterKind {
    /// `None` when the map is empty or names a threshold field with no
    /// rule-based counterpart.
    pub fn select(alert_filter: &BTreeMap<String, String>) -> Option<Self> {
        if alert_filter.is_empty() {
            return None;
        }
        match alert_filter.get("thresholdField").map(String::as_str) {
            None => Some(FilterKind::Algorithm),
            Some("impactToGlobal") => Some(FilterKind::SitewideImpact),
            Some("weight") => Some(FilterKind::PercentageChange),
            Some(_) => None,
        }
    }
}

fn parse_f64(value: Option<&String>, field: &str, function_id: i64) -> Result<f64> {
    let raw = value.ok_or_else(|| {
        MigrationError::Translation(format!(
            "property '{field}' is missing for anomaly function {function_id}"
        ))
    })?;
    raw.trim().parse::<f64>().map_err(|_| {
        MigrationError::Translation(format!(
            "property '{field}' of anomaly function {function_id} is not a number: '{raw}'"
        ))
    })
}

fn string_map(entries: &BTreeMap<String, String>) -> Map<String, Value> {
    entries
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect()
}

/// Translates a legacy function into a detection document.
pub fn translate_function(function: &LegacyFunction, dataset: &DatasetContext) -> Result<Document> {
    let mut doc = Document::new();
    doc.insert("detectionName".into(), json!(function.function_name));
    doc.insert("description".into(), json!(DESCRIPTION_PLACEHOLDER));
    doc.insert("metric".into(), json!(function.metric));
    doc.insert("active".into(), json!(function.active));
    doc.insert("dataset".into(), json!(function.collection));
    doc.insert("pipelineType".into(), json!(PIPELINE_TYPE));

    if let Some(dimensions) = function
        .explore_dimensions
        .as_deref()
        .filter(|d| !d.trim().is_empty())
    {
        doc.insert(
            "dimensionExploration".into(),
            Value::Object(dimension_exploration(function, dimensions)?),
        );
    }
    if let Some(filters) = function.filters.as_deref().filter(|f| !f.trim().is_empty()) {
        doc.insert("filters".into(), filters_value(parse_dimension_filters(filters)));
    }

    let mut rule = Map::new();
    rule.insert(
        "detection".into(),
        Value::Array(vec![Value::Object(detection_rule(function, dataset)?)]),
    );
    if let Some(filter) = filter_rule(function, dataset)? {
        rule.insert("filter".into(), Value::Array(vec![Value::Object(filter)]));
    }
    doc.insert("rules".into(), Value::Array(vec![Value::Object(rule)]));

    if let Some(merge) = &function.merge_config {
        if merge.strategy == MergeStrategy::FunctionDimensions {
            doc.insert(
                "merger".into(),
                json!({ "maxGap": merge.max_gap_ms, "maxDuration": merge.max_duration_ms }),
            );
        }
    }
    Ok(doc)
}

fn dimension_exploration(function: &LegacyFunction, dimensions: &str) -> Result<Map<String, Value>> {
    let mut out = Map::new();
    out.insert("dimensions".into(), json!([dimensions]));

    let data_filter = &function.data_filter;
    if data_filter.get("type").map(String::as_str) == Some("average_threshold") {
        out.insert("dimensionFilterMetric".into(), json!(data_filter.get("metricName")));
        let min_value = parse_f64(data_filter.get("threshold"), "threshold", function.id)?;
        out.insert("minValue".into(), json!(min_value));
        out.insert("minLiveZone".into(), json!(data_filter.get("minLiveZone")));
    }
    if DetectionKind::from_tag(&function.function_type) == DetectionKind::MinMaxThreshold {
        let properties = parse_properties(&function.properties);
        if let Some(volume) = properties.get("averageVolumeThreshold") {
            out.insert("minValue".into(), json!(volume));
        }
    }
    Ok(out)
}

fn detection_rule(function: &LegacyFunction, dataset: &DatasetContext) -> Result<Map<String, Value>> {
    let properties = parse_properties(&function.properties);
    let mut rule = Map::new();
    rule.insert("name".into(), json!(DETECTION_RULE_NAME));

    match DetectionKind::from_tag(&function.function_type) {
        DetectionKind::WeekOverWeek => {
            let threshold = parse_f64(properties.get("changeThreshold"), "changeThreshold", function.id)?;
            let pattern = if threshold > 0.0 { "UP" } else { "DOWN" };
            rule.insert("type".into(), json!(PERCENTAGE_RULE));
            rule.insert(
                "params".into(),
                json!({ "percentageChange": threshold.abs(), "pattern": pattern }),
            );
        }
        DetectionKind::MinMaxThreshold => {
            let mut params = Map::new();
            for key in ["min", "max"] {
                if let Some(value) = properties.get(key) {
                    params.insert(key.into(), json!(value));
                }
            }
            rule.insert("type".into(), json!(THRESHOLD_RULE));
            rule.insert("params".into(), Value::Object(params));
        }
        DetectionKind::Algorithm => {
            let period = bucket_period(function.bucket_size, &function.bucket_unit)?;
            let mut configuration = string_map(&properties);
            configuration.insert("variables.bucketPeriod".into(), json!(period));
            configuration.insert("variables.timeZone".into(), json!(dataset.timezone));

            rule.insert("type".into(), json!(MIGRATED_ALGORITHM));
            rule.insert("params".into(), json!({ "configuration": configuration }));
            rule.insert("windowSize".into(), json!(function.window_size));
            rule.insert("windowUnit".into(), json!(function.window_unit));
            if function.window_delay != 0 {
                rule.insert("windowDelay".into(), json!(function.window_delay));
                rule.insert("windowDelayUnit".into(), json!(function.window_delay_unit));
            }
            rule.insert("bucketPeriod".into(), json!(period));
        }
    }
    Ok(rule)
}

fn filter_rule(function: &LegacyFunction, dataset: &DatasetContext) -> Result<Option<Map<String, Value>>> {
    let alert_filter = &function.alert_filter;
    let Some(kind) = FilterKind::select(alert_filter) else {
        return Ok(None);
    };

    let (kind_name, params) = match kind {
        FilterKind::Algorithm => {
            let mut configuration = string_map(alert_filter);
            configuration.insert(
                "bucketPeriod".into(),
                json!(bucket_period(function.bucket_size, &function.bucket_unit)?),
            );
            configuration.insert("timeZone".into(), json!(dataset.timezone));
            (MIGRATED_ALGORITHM_FILTER, json!({ "configuration": configuration }))
        }
        FilterKind::SitewideImpact => {
            let threshold = parse_f64(alert_filter.get("maxThreshold"), "maxThreshold", function.id)?;
            let mut params = Map::new();
            params.insert("threshold".into(), json!(threshold.abs()));
            params.insert("pattern".into(), json!(UP_OR_DOWN));
            params.insert("sitewideMetricName".into(), json!(function.global_metric));
            params.insert("sitewideCollection".into(), json!(function.collection));
            if let Some(filters) = function
                .global_metric_filters
                .as_deref()
                .filter(|f| !f.trim().is_empty())
            {
                params.insert("filters".into(), filters_value(parse_dimension_filters(filters)));
            }
            (SITEWIDE_IMPACT_FILTER, Value::Object(params))
        }
        FilterKind::PercentageChange => {
            let threshold = parse_f64(alert_filter.get("maxThreshold"), "maxThreshold", function.id)?;
            (
                PERCENTAGE_CHANGE_FILTER,
                json!({ "threshold": threshold.abs(), "pattern": UP_OR_DOWN }),
            )
        }
    };

    let mut filter = Map::new();
    filter.insert("name".into(), json!(FILTER_RULE_NAME));
    filter.insert("type".into(), json!(kind_name));
    filter.insert("params".into(), params);
    Ok(Some(filter))
}

/// Translates a legacy alert into a subscription document.
///
/// `detection_names` are the unmarked names of the functions the alert
/// still references.
pub fn translate_alert(alert: &LegacyAlert, detection_names: &[String]) -> Document {
    let mut doc = Document::new();
    doc.insert("subscriptionGroupName".into(), json!(alert.name));
    doc.insert("cron".into(), json!(alert.cron_expression));
    doc.insert("active".into(), json!(alert.active));
    doc.insert("application".into(), json!(alert.application));
    doc.insert("emailSubjectStyle".into(), json!(alert.subject_type));
    doc.insert("fromAddress".into(), json!(alert.from_address));
    doc.insert("type".into(), json!(ALERTER_PIPELINE_TYPE));
    doc.insert(
        "recipients".into(),
        json!({
            "to": alert.recipients.to,
            "cc": alert.recipients.cc,
            "bcc": alert.recipients.bcc,
        }),
    );
    doc.insert("alertSchemes".into(), json!([{ "type": "EMAIL" }]));
    doc.insert("detectionName".into(), json!(detection_names));
    doc
}
