use chrono::Utc;
use ruleport_common::types::{DatasetConfig, MetricConfig};
use sea_orm::{ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter};

use crate::entities::{dataset_config, metric_config};
use crate::error::Result;
use crate::store::ConfigStore;
use crate::MetricFilter;

fn to_dataset(m: dataset_config::Model) -> DatasetConfig {
    DatasetConfig {
        id: m.id,
        dataset: m.dataset,
        timezone: m.timezone,
    }
}

fn to_metric(m: metric_config::Model) -> MetricConfig {
    MetricConfig {
        id: m.id,
        name: m.name,
        dataset: m.dataset,
    }
}

impl ConfigStore {
    pub async fn insert_dataset(&self, dataset: &str, timezone: &str) -> Result<DatasetConfig> {
        let now = Utc::now().fixed_offset();
        let am = dataset_config::ActiveModel {
            id: Set(ruleport_common::id::next_id()),
            dataset: Set(dataset.to_owned()),
            timezone: Set(timezone.to_owned()),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let model = am.insert(self.db()).await?;
        Ok(to_dataset(model))
    }

    pub async fn list_datasets_named(&self, dataset: &str) -> Result<Vec<DatasetConfig>> {
        let rows = dataset_config::Entity::find()
            .filter(dataset_config::Column::Dataset.eq(dataset))
            .all(self.db())
            .await?;
        Ok(rows.into_iter().map(to_dataset).collect())
    }

    pub async fn insert_metric(&self, name: &str, dataset: &str) -> Result<MetricConfig> {
        let now = Utc::now().fixed_offset();
        let am = metric_config::ActiveModel {
            id: Set(ruleport_common::id::next_id()),
            name: Set(name.to_owned()),
            dataset: Set(dataset.to_owned()),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let model = am.insert(self.db()).await?;
        Ok(to_metric(model))
    }

    pub async fn list_metrics(&self, filter: &MetricFilter) -> Result<Vec<MetricConfig>> {
        let mut q = metric_config::Entity::find();
        if let Some(name) = &filter.name_eq {
            q = q.filter(metric_config::Column::Name.eq(name.as_str()));
        }
        if let Some(dataset) = &filter.dataset_eq {
            q = q.filter(metric_config::Column::Dataset.eq(dataset.as_str()));
        }
        let rows = q.all(self.db()).await?;
        Ok(rows.into_iter().map(to_metric).collect())
    }
}
