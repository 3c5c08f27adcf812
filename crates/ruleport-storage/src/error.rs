/// Errors that can occur within the storage layer.
///
/// # Examples
///
/// ```rust
/// use ruleport_storage::error::StorageError;
///
/// let err = StorageError::NotFound {
///     entity: "anomaly_function",
///     id: 99,
/// };
/// assert!(err.to_string().contains("anomaly_function"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A required record was not found in the database.
    #[error("Storage: {entity} not found (id={id})")]
    NotFound { entity: &'static str, id: i64 },

    /// An underlying SeaORM / driver error.
    #[error("Storage: database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// JSON serialization or deserialization failure (e.g. alert_filter columns).
    #[error("Storage: JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A column held a value that does not map onto the domain type.
    #[error("Storage: invalid value in column '{column}': {message}")]
    InvalidColumn {
        column: &'static str,
        message: String,
    },

    /// Generic storage error for cases not covered by other variants.
    #[error("Storage: {0}")]
    Other(String),
}

/// Convenience `Result` alias for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;
