//! Turns translated documents into persistable target config records.

use ruleport_common::types::{NewDetectionConfig, NewSubscriptionConfig};
use serde_json::Value;

use crate::document::{to_yaml, Document};

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("field '{field}' must be {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },

    #[error("failed to render document: {0}")]
    Render(#[from] serde_yaml::Error),
}

/// Converts a target document into a record ready to be inserted.
pub trait DocumentBuilder: Send + Sync {
    fn build_detection(&self, document: &Document) -> Result<NewDetectionConfig, BuildError>;

    fn build_subscription(&self, document: &Document)
        -> Result<NewSubscriptionConfig, BuildError>;
}

/// Stores the document itself, rendered as YAML, as the config body.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlConfigBuilder;

fn required_str<'a>(document: &'a Document, field: &'static str) -> Result<&'a str, BuildError> {
    match document.get(field) {
        None | Some(Value::Null) => Err(BuildError::MissingField(field)),
        Some(Value::String(s)) if s.trim().is_empty() => Err(BuildError::MissingField(field)),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(BuildError::InvalidField {
            field,
            expected: "a string",
        }),
    }
}

fn optional_str(document: &Document, field: &'static str) -> Result<String, BuildError> {
    match document.get(field) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(BuildError::InvalidField {
            field,
            expected: "a string",
        }),
    }
}

fn active_flag(document: &Document) -> Result<bool, BuildError> {
    match document.get("active") {
        None => Ok(true),
        Some(Value::Bool(b)) => Ok(*b),
        Some(_) => Err(BuildError::InvalidField {
            field: "active",
            expected: "a boolean",
        }),
    }
}

impl DocumentBuilder for YamlConfigBuilder {
    fn build_detection(&self, document: &Document) -> Result<NewDetectionConfig, BuildError> {
        let name = required_str(document, "detectionName")?;
        required_str(document, "metric")?;
        required_str(document, "dataset")?;
        match document.get("rules") {
            Some(Value::Array(rules)) if !rules.is_empty() => {}
            Some(Value::Array(_)) | None => return Err(BuildError::MissingField("rules")),
            Some(_) => {
                return Err(BuildError::InvalidField {
                    field: "rules",
                    expected: "a list",
                })
            }
        }

        Ok(NewDetectionConfig {
            name: name.to_string(),
            description: optional_str(document, "description")?,
            active: active_flag(document)?,
            yaml: to_yaml(document)?,
        })
    }

    fn build_subscription(
        &self,
        document: &Document,
    ) -> Result<NewSubscriptionConfig, BuildError> {
        let name = required_str(document, "subscriptionGroupName")?;
        let cron = required_str(document, "cron")?;
        let detection_names = match document.get("detectionName") {
            Some(Value::Array(names)) => names
                .iter()
                .map(|n| {
                    n.as_str().map(str::to_string).ok_or(BuildError::InvalidField {
                        field: "detectionName",
                        expected: "a list of strings",
                    })
                })
                .collect::<Result<Vec<_>, _>>()?,
            None => return Err(BuildError::MissingField("detectionName")),
            Some(_) => {
                return Err(BuildError::InvalidField {
                    field: "detectionName",
                    expected: "a list of strings",
                })
            }
        };

        Ok(NewSubscriptionConfig {
            name: name.to_string(),
            application: optional_str(document, "application")?,
            active: active_flag(document)?,
            cron: cron.to_string(),
            yaml: to_yaml(document)?,
            detection_names,
        })
    }
}
