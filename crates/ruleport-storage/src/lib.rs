//! Persistence for legacy and migrated configuration records.
//!
//! The default implementation ([`store::ConfigStore`]) uses SeaORM on top of
//! SQLite and applies the `migration` crate schema on connect. Migration code
//! is written against the [`LegacyConfigStore`] trait so the store can be
//! wrapped or replaced.

pub mod entities;
pub mod error;
pub mod store;

#[cfg(test)]
mod tests;

use async_trait::async_trait;
use ruleport_common::types::{
    DatasetConfig, DetectionConfig, HistoricalResult, LegacyAlert, LegacyFunction, MetricConfig,
    NewDetectionConfig, NewSubscriptionConfig, SubscriptionConfig,
};

use crate::error::Result;

pub use store::ConfigStore;

/// Equality filter over legacy alerts. Every field that is set must match.
#[derive(Debug, Clone, Default)]
pub struct AlertFilter {
    pub application_eq: Option<String>,
    pub name_eq: Option<String>,
}

/// Equality filter over metric definitions. Every field that is set must match.
///
/// # Examples
///
/// ```
/// use ruleport_storage::MetricFilter;
///
/// let filter = MetricFilter::named("page_views", "web_traffic");
/// assert_eq!(filter.name_eq.as_deref(), Some("page_views"));
/// assert_eq!(filter.dataset_eq.as_deref(), Some("web_traffic"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MetricFilter {
    pub name_eq: Option<String>,
    pub dataset_eq: Option<String>,
}

impl MetricFilter {
    pub fn named(name: &str, dataset: &str) -> Self {
        Self {
            name_eq: Some(name.to_string()),
            dataset_eq: Some(dataset.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SubscriptionFilter {
    pub name_eq: Option<String>,
    pub application_eq: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct HistoricalResultFilter {
    pub function_id_eq: Option<i64>,
    pub detection_config_id_eq: Option<i64>,
}

/// Record managers the migration core reads from and writes to.
///
/// `insert_*` calls return the stored record including its generated id.
/// `update_*` calls return the number of affected rows; zero means the
/// record no longer exists.
#[async_trait]
pub trait LegacyConfigStore: Send + Sync {
    async fn get_function(&self, id: i64) -> Result<Option<LegacyFunction>>;

    async fn list_functions(&self) -> Result<Vec<LegacyFunction>>;

    async fn update_function(&self, function: &LegacyFunction) -> Result<u64>;

    async fn get_alert(&self, id: i64) -> Result<Option<LegacyAlert>>;

    async fn list_alerts(&self, filter: &AlertFilter) -> Result<Vec<LegacyAlert>>;

    async fn update_alert(&self, alert: &LegacyAlert) -> Result<u64>;

    /// Dataset definitions with the given dataset name.
    async fn find_datasets(&self, dataset: &str) -> Result<Vec<DatasetConfig>>;

    async fn find_metrics(&self, filter: &MetricFilter) -> Result<Vec<MetricConfig>>;

    async fn insert_detection_config(&self, config: &NewDetectionConfig) -> Result<DetectionConfig>;

    async fn update_detection_config(&self, config: &DetectionConfig) -> Result<u64>;

    async fn find_subscription_configs(
        &self,
        filter: &SubscriptionFilter,
    ) -> Result<Vec<SubscriptionConfig>>;

    async fn insert_subscription_config(
        &self,
        config: &NewSubscriptionConfig,
    ) -> Result<SubscriptionConfig>;

    async fn update_subscription_config(&self, config: &SubscriptionConfig) -> Result<u64>;

    async fn find_historical_results(
        &self,
        filter: &HistoricalResultFilter,
    ) -> Result<Vec<HistoricalResult>>;

    async fn update_historical_result(&self, result: &HistoricalResult) -> Result<u64>;
}
