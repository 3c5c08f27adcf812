use ruleport_storage::error::StorageError;

/// Item-level failures raised while migrating a legacy record.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// A dataset or metric reference no longer resolves. The caller may skip
    /// the item.
    #[error("{0}")]
    Validation(String),

    /// The legacy record cannot be mapped onto a target document.
    #[error("translation failed: {0}")]
    Translation(String),

    /// A store write yielded no record or touched zero rows.
    #[error("{0}")]
    Persistence(String),

    /// A historical result could not be repointed. Results updated before
    /// the failing one keep their new owner.
    #[error(
        "Failed to update the anomaly {anomaly_id} with the new detection id for anomaly function {detection_id}"
    )]
    Cascade { anomaly_id: i64, detection_id: i64 },

    /// One or more functions referenced by an alert did not migrate cleanly.
    #[error("Failures/Warnings found. anomalyFailureCount {failures} and anomalyWarningCount {warnings}")]
    Aggregate { failures: usize, warnings: usize },

    #[error("{entity} cannot be found for id {id}")]
    NotFound { entity: &'static str, id: i64 },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl MigrationError {
    /// Only validation failures leave the item untouched and safe to skip.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, MigrationError::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, MigrationError>;
