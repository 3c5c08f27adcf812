use chrono::Utc;
use ruleport_common::types::HistoricalResult;
use sea_orm::{
    ActiveModelTrait, ActiveValue::{NotSet, Set}, ColumnTrait, EntityTrait, Order,
    PaginatorTrait, QueryFilter, QueryOrder, Select,
};
use serde_json::{Map, Value};

use crate::entities::merged_anomaly::{self, Column, Entity};
use crate::error::{Result, StorageError};
use crate::store::ConfigStore;
use crate::HistoricalResultFilter;

fn to_result(m: merged_anomaly::Model) -> Result<HistoricalResult> {
    let properties: Map<String, Value> = if m.properties.trim().is_empty() {
        Map::new()
    } else {
        serde_json::from_str(&m.properties).map_err(|e| StorageError::InvalidColumn {
            column: "properties",
            message: e.to_string(),
        })?
    };
    Ok(HistoricalResult {
        id: m.id,
        function_id: m.function_id,
        detection_config_id: m.detection_config_id,
        metric: m.metric,
        collection: m.collection,
        start_time: m.start_time,
        end_time: m.end_time,
        properties,
    })
}

fn apply_filter(mut q: Select<Entity>, filter: &HistoricalResultFilter) -> Select<Entity> {
    if let Some(function_id) = filter.function_id_eq {
        q = q.filter(Column::FunctionId.eq(function_id));
    }
    if let Some(detection_id) = filter.detection_config_id_eq {
        q = q.filter(Column::DetectionConfigId.eq(detection_id));
    }
    q
}

impl ConfigStore {
    /// 写入一条历史异常记录。`id` 为 0 时自动分配。
    pub async fn insert_historical_result(&self, row: &HistoricalResult) -> Result<HistoricalResult> {
        let now = Utc::now().fixed_offset();
        let id = if row.id == 0 {
            ruleport_common::id::next_id()
        } else {
            row.id
        };
        let am = merged_anomaly::ActiveModel {
            id: Set(id),
            function_id: Set(row.function_id),
            detection_config_id: Set(row.detection_config_id),
            metric: Set(row.metric.clone()),
            collection: Set(row.collection.clone()),
            start_time: Set(row.start_time),
            end_time: Set(row.end_time),
            properties: Set(serde_json::to_string(&row.properties)?),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let model = am.insert(self.db()).await?;
        to_result(model)
    }

    pub async fn list_historical_results(
        &self,
        filter: &HistoricalResultFilter,
    ) -> Result<Vec<HistoricalResult>> {
        let rows = apply_filter(Entity::find(), filter)
            .order_by(Column::StartTime, Order::Asc)
            .all(self.db())
            .await?;
        rows.into_iter().map(to_result).collect()
    }

    pub async fn count_historical_results(&self, filter: &HistoricalResultFilter) -> Result<u64> {
        Ok(apply_filter(Entity::find(), filter).count(self.db()).await?)
    }

    pub async fn save_historical_result(&self, row: &HistoricalResult) -> Result<u64> {
        let am = merged_anomaly::ActiveModel {
            id: NotSet,
            function_id: Set(row.function_id),
            detection_config_id: Set(row.detection_config_id),
            metric: Set(row.metric.clone()),
            collection: Set(row.collection.clone()),
            start_time: Set(row.start_time),
            end_time: Set(row.end_time),
            properties: Set(serde_json::to_string(&row.properties)?),
            created_at: NotSet,
            updated_at: Set(Utc::now().fixed_offset()),
        };
        let res = Entity::update_many()
            .set(am)
            .filter(Column::Id.eq(row.id))
            .exec(self.db())
            .await?;
        Ok(res.rows_affected)
    }
}
