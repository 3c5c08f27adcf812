use ruleport_storage::{HistoricalResultFilter, LegacyConfigStore};
use tracing::info;

use crate::error::{MigrationError, Result};

/// Cached timeline payload that has no meaning under the new schema.
pub const TIMELINE_PROPERTY: &str = "anomalyTimelinesView";

/// Repoints the historical results of a migrated function to its new
/// detection config.
pub struct CascadeUpdater<'a> {
    store: &'a dyn LegacyConfigStore,
}

impl<'a> CascadeUpdater<'a> {
    pub fn new(store: &'a dyn LegacyConfigStore) -> Self {
        Self { store }
    }

    /// Returns how many results were repointed. Stops at the first result
    /// whose update touches no row; earlier results stay repointed.
    pub async fn repoint(&self, function_id: i64, detection_id: i64) -> Result<usize> {
        let filter = HistoricalResultFilter {
            function_id_eq: Some(function_id),
            ..Default::default()
        };
        let results = self.store.find_historical_results(&filter).await?;

        let mut updated = 0;
        for mut result in results {
            result.properties.remove(TIMELINE_PROPERTY);
            result.detection_config_id = Some(detection_id);
            if self.store.update_historical_result(&result).await? == 0 {
                return Err(MigrationError::Cascade {
                    anomaly_id: result.id,
                    detection_id,
                });
            }
            updated += 1;
        }

        info!(function_id, detection_id, updated, "[MIG] Repointed historical anomalies");
        Ok(updated)
    }
}
