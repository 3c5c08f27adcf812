use ruleport_common::types::LegacyFunction;
use ruleport_storage::{LegacyConfigStore, MetricFilter};

use crate::error::{MigrationError, Result};

/// Checks that a legacy function's dataset and metric still resolve.
pub struct Validator<'a> {
    store: &'a dyn LegacyConfigStore,
}

impl<'a> Validator<'a> {
    pub fn new(store: &'a dyn LegacyConfigStore) -> Self {
        Self { store }
    }

    pub async fn validate(&self, function: Option<&LegacyFunction>) -> Result<()> {
        let Some(function) = function else {
            return Err(MigrationError::Validation(
                "Couldn't find anomaly function.".into(),
            ));
        };

        let datasets = self.store.find_datasets(&function.collection).await?;
        if datasets.is_empty() {
            return Err(MigrationError::Validation(format!(
                "Dataset cannot be found for anomaly function {}",
                function.id
            )));
        }

        let metrics = self
            .store
            .find_metrics(&MetricFilter::named(&function.metric, &function.collection))
            .await?;
        if metrics.is_empty() {
            return Err(MigrationError::Validation(format!(
                "Metric cannot be found for anomaly function {}",
                function.id
            )));
        }
        Ok(())
    }
}
