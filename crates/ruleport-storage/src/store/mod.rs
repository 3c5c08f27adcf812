use async_trait::async_trait;
use migration::{Migrator, MigratorTrait};
use ruleport_common::types::{
    DatasetConfig, DetectionConfig, HistoricalResult, LegacyAlert, LegacyFunction, MetricConfig,
    NewDetectionConfig, NewSubscriptionConfig, SubscriptionConfig,
};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection};

use crate::error::Result;
use crate::{
    AlertFilter, HistoricalResultFilter, LegacyConfigStore, MetricFilter, SubscriptionFilter,
};

pub mod alert;
pub mod anomaly;
pub mod detection;
pub mod function;
pub mod reference;

/// 配置数据库的统一访问层。
///
/// 所有方法均为 `async fn`，底层使用 SeaORM + SQLite。
pub struct ConfigStore {
    pub(crate) db: DatabaseConnection,
}

impl ConfigStore {
    /// 连接并初始化配置数据库。
    ///
    /// `db_url` 示例：`sqlite:///data/ruleport.db?mode=rwc`
    ///
    /// 自动运行 `sea-orm-migration` 迁移，确保 Schema 最新。
    pub async fn connect(db_url: &str) -> Result<Self> {
        let db = Database::connect(db_url).await?;

        // WAL 模式仅对 SQLite 有效
        if db_url.starts_with("sqlite://") {
            db.execute_unprepared("PRAGMA journal_mode=WAL;").await?;
        }

        Migrator::up(&db, None).await?;
        tracing::info!(db_url = %db_url, "Initialized config store (SeaORM)");

        Ok(Self { db })
    }

    /// 返回底层数据库连接引用（供子模块使用）。
    pub(crate) fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl LegacyConfigStore for ConfigStore {
    async fn get_function(&self, id: i64) -> Result<Option<LegacyFunction>> {
        self.get_function_by_id(id).await
    }

    async fn list_functions(&self) -> Result<Vec<LegacyFunction>> {
        self.list_all_functions().await
    }

    async fn update_function(&self, function: &LegacyFunction) -> Result<u64> {
        self.save_function(function).await
    }

    async fn get_alert(&self, id: i64) -> Result<Option<LegacyAlert>> {
        self.get_alert_by_id(id).await
    }

    async fn list_alerts(&self, filter: &AlertFilter) -> Result<Vec<LegacyAlert>> {
        self.list_alerts_by(filter).await
    }

    async fn update_alert(&self, alert: &LegacyAlert) -> Result<u64> {
        self.save_alert(alert).await
    }

    async fn find_datasets(&self, dataset: &str) -> Result<Vec<DatasetConfig>> {
        self.list_datasets_named(dataset).await
    }

    async fn find_metrics(&self, filter: &MetricFilter) -> Result<Vec<MetricConfig>> {
        self.list_metrics(filter).await
    }

    async fn insert_detection_config(&self, config: &NewDetectionConfig) -> Result<DetectionConfig> {
        self.create_detection_config(config).await
    }

    async fn update_detection_config(&self, config: &DetectionConfig) -> Result<u64> {
        self.save_detection_config(config).await
    }

    async fn find_subscription_configs(
        &self,
        filter: &SubscriptionFilter,
    ) -> Result<Vec<SubscriptionConfig>> {
        self.list_subscription_configs(filter).await
    }

    async fn insert_subscription_config(
        &self,
        config: &NewSubscriptionConfig,
    ) -> Result<SubscriptionConfig> {
        self.create_subscription_config(config).await
    }

    async fn update_subscription_config(&self, config: &SubscriptionConfig) -> Result<u64> {
        self.save_subscription_config(config).await
    }

    async fn find_historical_results(
        &self,
        filter: &HistoricalResultFilter,
    ) -> Result<Vec<HistoricalResult>> {
        self.list_historical_results(filter).await
    }

    async fn update_historical_result(&self, result: &HistoricalResult) -> Result<u64> {
        self.save_historical_result(result).await
    }
}
