use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::MigrationError;

/// A referenced function that did not migrate during an alert migration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionIssue {
    pub function_id: i64,
    pub message: String,
}

/// Result of migrating one legacy alert.
///
/// `tagged` and [`AlertMigrationOutcome::is_clean`] are separate signals: an
/// alert is tagged as migrated even when some of its functions failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlertMigrationOutcome {
    pub alert_id: i64,
    /// Subscription config the alert now maps to.
    pub target_id: i64,
    /// The alert had been migrated by an earlier run; nothing was written.
    pub already_migrated: bool,
    /// The legacy alert carries the migration marker.
    pub tagged: bool,
    /// A subscription config with the same name already existed and was reused.
    pub reused_existing: bool,
    pub migrated_function_ids: Vec<i64>,
    /// Functions dropped because they failed validation.
    pub warnings: Vec<FunctionIssue>,
    /// Functions dropped for any other reason.
    pub failures: Vec<FunctionIssue>,
}

impl AlertMigrationOutcome {
    pub(crate) fn already_migrated(alert_id: i64, target_id: i64) -> Self {
        Self {
            alert_id,
            target_id,
            already_migrated: true,
            tagged: true,
            reused_existing: false,
            migrated_function_ids: Vec::new(),
            warnings: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty() && self.failures.is_empty()
    }

    /// The aggregate failure to report for this alert, if any.
    pub fn aggregate_error(&self) -> Option<MigrationError> {
        if self.is_clean() {
            return None;
        }
        Some(MigrationError::Aggregate {
            failures: self.failures.len(),
            warnings: self.warnings.len(),
        })
    }
}

/// Per-item outcome of a batch run. Only failed items get an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MigrationReport {
    errors: BTreeMap<String, String>,
}

impl MigrationReport {
    pub fn record_failure(&mut self, item: impl Into<String>, message: impl Into<String>) {
        self.errors.insert(item.into(), message.into());
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn get(&self, item: &str) -> Option<&str> {
        self.errors.get(item).map(String::as_str)
    }

    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }
}

/// Outcome of migrating every alert of one application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum ApplicationReport {
    Migrated(String),
    Failed(MigrationReport),
}

impl ApplicationReport {
    pub fn from_report(application: &str, report: MigrationReport) -> Self {
        if report.is_success() {
            ApplicationReport::Migrated(format!(
                "Application {application} has been successfully migrated"
            ))
        } else {
            ApplicationReport::Failed(report)
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ApplicationReport::Migrated(_))
    }
}
