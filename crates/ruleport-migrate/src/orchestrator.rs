//! Sequences validation, translation, persistence, cascade and tagging.
//!
//! Steps run strictly in order and stop at the first fatal error. Nothing
//! is rolled back: a target config created before a failed cascade or tag
//! stays in place, and the legacy record stays untagged so a later run can
//! retry it.

use ruleport_common::status::{original_name, tagged_name, Migratable, MigrationStatus};
use ruleport_common::types::{LegacyAlert, LegacyFunction};
use ruleport_storage::{AlertFilter, LegacyConfigStore, SubscriptionFilter};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::builder::DocumentBuilder;
use crate::cascade::CascadeUpdater;
use crate::document::Document;
use crate::error::{MigrationError, Result};
use crate::locks::{EntityKey, EntityLocks};
use crate::report::{AlertMigrationOutcome, ApplicationReport, FunctionIssue, MigrationReport};
use crate::translator::{translate_alert, translate_function, DatasetContext};
use crate::validator::Validator;

pub struct MigrationOrchestrator {
    store: Arc<dyn LegacyConfigStore>,
    builder: Arc<dyn DocumentBuilder>,
    locks: EntityLocks,
}

fn status_of<T: Migratable>(record: &T) -> Result<MigrationStatus> {
    record
        .migration_status()
        .map_err(|e| MigrationError::Translation(e.to_string()))
}

impl MigrationOrchestrator {
    pub fn new(store: Arc<dyn LegacyConfigStore>, builder: Arc<dyn DocumentBuilder>) -> Self {
        Self {
            store,
            builder,
            locks: EntityLocks::default(),
        }
    }

    /// Turns per-entity serialization on or off.
    pub fn with_entity_locks(mut self, enabled: bool) -> Self {
        self.locks = EntityLocks::new(enabled);
        self
    }

    pub fn store(&self) -> &dyn LegacyConfigStore {
        self.store.as_ref()
    }

    async fn dataset_context(&self, function: &LegacyFunction) -> Result<DatasetContext> {
        let datasets = self.store.find_datasets(&function.collection).await?;
        match datasets.into_iter().next() {
            Some(dataset) => Ok(DatasetContext {
                timezone: dataset.timezone,
            }),
            None => {
                warn!(
                    function_id = function.id,
                    dataset = %function.collection,
                    "[MIG] Dataset not found, using UTC"
                );
                Ok(DatasetContext::default())
            }
        }
    }

    /// Unmarked names of the functions an alert references. Ids that no
    /// longer resolve are skipped.
    pub async fn resolve_detection_names(&self, alert: &LegacyAlert) -> Result<Vec<String>> {
        let mut names = Vec::with_capacity(alert.function_ids.len());
        for &function_id in &alert.function_ids {
            match self.store.get_function(function_id).await? {
                Some(function) => names.push(original_name(&function.function_name).to_string()),
                None => warn!(
                    function_id,
                    alert_id = alert.id,
                    "[MIG] Anomaly function cannot be found while generating notification YAML from legacy notification"
                ),
            }
        }
        Ok(names)
    }

    /// Translation of a stored function, without side effects.
    pub async fn function_document(&self, function_id: i64) -> Result<Document> {
        let function = self
            .store
            .get_function(function_id)
            .await?
            .ok_or(MigrationError::NotFound {
                entity: "Legacy Anomaly function",
                id: function_id,
            })?;
        let dataset = self.dataset_context(&function).await?;
        translate_function(&function, &dataset)
    }

    /// Translation of a stored alert, without side effects.
    pub async fn alert_document(&self, alert_id: i64) -> Result<Document> {
        let alert = self
            .store
            .get_alert(alert_id)
            .await?
            .ok_or(MigrationError::NotFound {
                entity: "Legacy alert",
                id: alert_id,
            })?;
        let names = self.resolve_detection_names(&alert).await?;
        Ok(translate_alert(&alert, &names))
    }

    /// Migrates one function and returns the id of its detection config.
    ///
    /// A function that is already migrated returns its existing target id
    /// without touching the store.
    pub async fn migrate_function(&self, function_id: i64) -> Result<i64> {
        let _guard = self.locks.acquire(EntityKey::Function(function_id)).await;

        let function = self
            .store
            .get_function(function_id)
            .await?
            .ok_or_else(|| MigrationError::Validation("Couldn't find anomaly function.".into()))?;

        info!(
            function_id,
            name = %function.function_name,
            "[MIG] Migrating anomaly function"
        );
        if let MigrationStatus::Migrated(target_id) = status_of(&function)? {
            info!(function_id, target_id, "[MIG] Anomaly function is already migrated");
            return Ok(target_id);
        }

        Validator::new(self.store.as_ref())
            .validate(Some(&function))
            .await?;

        self.migrate_validated(function).await
    }

    async fn migrate_validated(&self, mut function: LegacyFunction) -> Result<i64> {
        let dataset = self.dataset_context(&function).await?;
        let document = translate_function(&function, &dataset)?;
        let new_config = self.builder.build_detection(&document).map_err(|e| {
            MigrationError::Persistence(format!(
                "Error translating anomaly function config to the detection config: {e}"
            ))
        })?;

        let mut detection = self
            .store
            .insert_detection_config(&new_config)
            .await
            .map_err(|e| {
                MigrationError::Persistence(format!("Error saving the new detection config: {e}"))
            })?;

        // owner is only known from the legacy record
        detection.created_by = function.created_by.clone();
        if self.store.update_detection_config(&detection).await? == 0 {
            return Err(MigrationError::Persistence(
                "Error saving the new detection config after updating the owner.".into(),
            ));
        }

        CascadeUpdater::new(self.store.as_ref())
            .repoint(function.id, detection.id)
            .await?;

        function.active = false;
        function.function_name = tagged_name(&function.function_name, detection.id);
        function.migrated_to = Some(detection.id);
        if self.store.update_function(&function).await? == 0 {
            return Err(MigrationError::Persistence(format!(
                "Anomaly function migrated successfully but failed to disable and update the migration status of the old anomaly function. Recommend doing it manually. Migrated detection id {}",
                detection.id
            )));
        }

        info!(
            function_id = function.id,
            detection_id = detection.id,
            name = %function.function_name,
            "[MIG] Successfully migrated anomaly function"
        );
        Ok(detection.id)
    }

    /// Migrates an alert together with every function it references.
    ///
    /// Functions that fail are dropped from the alert and recorded in the
    /// outcome. The alert itself is tagged as migrated once its subscription
    /// config exists, whether or not every function made it.
    pub async fn migrate_alert(&self, alert_id: i64) -> Result<AlertMigrationOutcome> {
        let _guard = self.locks.acquire(EntityKey::Alert(alert_id)).await;

        let mut alert = self
            .store
            .get_alert(alert_id)
            .await?
            .ok_or(MigrationError::NotFound {
                entity: "Legacy alert",
                id: alert_id,
            })?;

        info!(alert_id, name = %alert.name, "[MIG] Migrating alert");
        if let MigrationStatus::Migrated(target_id) = status_of(&alert)? {
            info!(alert_id, target_id, "[MIG] Alert is already migrated. Skipping!");
            return Ok(AlertMigrationOutcome::already_migrated(alert_id, target_id));
        }

        let mut migrated = Vec::new();
        let mut warnings = Vec::new();
        let mut failures = Vec::new();
        for &function_id in &alert.function_ids {
            match self.migrate_function(function_id).await {
                Ok(_) => migrated.push(function_id),
                Err(e) if e.is_recoverable() => {
                    warn!(alert_id, function_id, error = %e, "[MIG] Anomaly function failed validation");
                    warnings.push(FunctionIssue {
                        function_id,
                        message: e.to_string(),
                    });
                }
                Err(e) => {
                    error!(alert_id, function_id, error = %e, "[MIG] Failed to migrate anomaly function");
                    failures.push(FunctionIssue {
                        function_id,
                        message: e.to_string(),
                    });
                }
            }
        }
        alert.function_ids = migrated.clone();

        let names = self.resolve_detection_names(&alert).await?;
        let document = translate_alert(&alert, &names);

        let existing = self
            .store
            .find_subscription_configs(&SubscriptionFilter {
                name_eq: Some(alert.name.clone()),
                ..Default::default()
            })
            .await?;
        let (target_id, reused_existing) = match existing.into_iter().next() {
            Some(subscription) => {
                warn!(
                    alert_id,
                    subscription_id = subscription.id,
                    "[MIG] Subscription config already exists, skipping creation"
                );
                (subscription.id, true)
            }
            None => (self.create_subscription(&alert, &document).await?, false),
        };

        alert.active = false;
        alert.name = tagged_name(&alert.name, target_id);
        alert.migrated_to = Some(target_id);
        if self.store.update_alert(&alert).await? == 0 {
            return Err(MigrationError::Persistence(format!(
                "Alert migrated successfully but failed to disable and update the migration status of the old alert. Migrated subscription id {target_id}"
            )));
        }

        info!(
            alert_id,
            subscription_id = target_id,
            migrated = migrated.len(),
            warnings = warnings.len(),
            failures = failures.len(),
            "[MIG] Alert tagged as migrated"
        );
        Ok(AlertMigrationOutcome {
            alert_id,
            target_id,
            already_migrated: false,
            tagged: true,
            reused_existing,
            migrated_function_ids: migrated,
            warnings,
            failures,
        })
    }

    async fn create_subscription(&self, alert: &LegacyAlert, document: &Document) -> Result<i64> {
        let new_config = self.builder.build_subscription(document).map_err(|e| {
            MigrationError::Persistence(format!(
                "Error translating legacy alert to the subscription config: {e}"
            ))
        })?;
        let mut subscription = self
            .store
            .insert_subscription_config(&new_config)
            .await
            .map_err(|e| {
                MigrationError::Persistence(format!(
                    "Error saving the new subscription config: {e}"
                ))
            })?;

        subscription.created_by = alert.created_by.clone();
        if self.store.update_subscription_config(&subscription).await? == 0 {
            return Err(MigrationError::Persistence(
                "Error saving the new subscription config after updating the owner.".into(),
            ));
        }
        Ok(subscription.id)
    }

    /// Migrates every alert of an application. A failed alert does not stop
    /// the ones after it.
    pub async fn migrate_application(&self, application: &str) -> Result<ApplicationReport> {
        let alerts = self
            .store
            .list_alerts(&AlertFilter {
                application_eq: Some(application.to_string()),
                ..Default::default()
            })
            .await?;

        let mut report = MigrationReport::default();
        for alert in alerts {
            let failure = match self.migrate_alert(alert.id).await {
                Ok(outcome) => outcome.aggregate_error(),
                Err(e) => Some(e),
            };
            if let Some(e) = failure {
                error!(alert_id = alert.id, name = %alert.name, error = %e, "[MIG] Failed to migrate alert");
                report.record_failure(
                    format!("Status of alert {}", alert.id),
                    format!(
                        "Failed to migrate alert ID {} with name {} due to {}",
                        alert.id, alert.name, e
                    ),
                );
            }
        }
        Ok(ApplicationReport::from_report(application, report))
    }

    /// Migrates every function not yet tagged, each on its own.
    pub async fn migrate_unsubscribed_functions(&self) -> Result<MigrationReport> {
        let functions = self.store.list_functions().await?;
        let mut report = MigrationReport::default();

        for function in functions {
            let key = format!("Failed to migrate {}", function.id);
            match function.migration_status() {
                Ok(MigrationStatus::Migrated(_)) => {
                    info!(name = %function.function_name, "[MIG] Function already migrated");
                    continue;
                }
                Ok(MigrationStatus::Active) => {}
                Err(e) => {
                    report.record_failure(key, format!("Error : {e}"));
                    continue;
                }
            }

            match self.migrate_function(function.id).await {
                Ok(_) => {}
                Err(MigrationError::Validation(message)) => {
                    info!(name = %function.function_name, error = %message, "[MIG] Function failed validation");
                    report.record_failure(key, format!("Validation Error : {message}"));
                }
                Err(e) => {
                    error!(function_id = function.id, error = %e, "[MIG] Failed to migrate anomaly function");
                    report.record_failure(key, format!("Error : {e}"));
                }
            }
        }
        Ok(report)
    }
}
