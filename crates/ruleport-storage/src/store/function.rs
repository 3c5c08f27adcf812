use chrono::Utc;
use ruleport_common::types::{LegacyFunction, MergeConfig};
use sea_orm::{
    ActiveValue::{NotSet, Set},
    ActiveModelTrait, ColumnTrait, EntityTrait, Order, QueryFilter, QueryOrder,
};
use std::collections::BTreeMap;

use crate::entities::anomaly_function::{self, Column, Entity};
use crate::error::{Result, StorageError};
use crate::store::ConfigStore;

fn parse_string_map(column: &'static str, raw: &str) -> Result<BTreeMap<String, String>> {
    if raw.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    serde_json::from_str(raw).map_err(|e| StorageError::InvalidColumn {
        column,
        message: e.to_string(),
    })
}

fn to_function(m: anomaly_function::Model) -> Result<LegacyFunction> {
    let merge_config = match m.merge_strategy {
        Some(strategy) => Some(MergeConfig {
            strategy: strategy
                .parse()
                .map_err(|message| StorageError::InvalidColumn {
                    column: "merge_strategy",
                    message,
                })?,
            max_gap_ms: m.merge_max_gap.unwrap_or(0),
            max_duration_ms: m.merge_max_duration.unwrap_or(0),
        }),
        None => None,
    };
    Ok(LegacyFunction {
        id: m.id,
        function_name: m.function_name,
        active: m.active,
        metric: m.metric,
        collection: m.collection,
        function_type: m.function_type,
        properties: m.properties,
        bucket_size: m.bucket_size,
        bucket_unit: m.bucket_unit,
        window_size: m.window_size,
        window_unit: m.window_unit,
        window_delay: m.window_delay,
        window_delay_unit: m.window_delay_unit,
        explore_dimensions: m.explore_dimensions,
        filters: m.filters,
        data_filter: parse_string_map("data_filter", &m.data_filter)?,
        alert_filter: parse_string_map("alert_filter", &m.alert_filter)?,
        merge_config,
        global_metric: m.global_metric,
        global_metric_filters: m.global_metric_filters,
        created_by: m.created_by,
        migrated_to: m.migrated_to,
    })
}

/// Column values shared by insert and update; timestamps are left to the caller.
fn to_active(f: &LegacyFunction) -> Result<anomaly_function::ActiveModel> {
    Ok(anomaly_function::ActiveModel {
        id: Set(f.id),
        function_name: Set(f.function_name.clone()),
        active: Set(f.active),
        metric: Set(f.metric.clone()),
        collection: Set(f.collection.clone()),
        function_type: Set(f.function_type.clone()),
        properties: Set(f.properties.clone()),
        bucket_size: Set(f.bucket_size),
        bucket_unit: Set(f.bucket_unit.clone()),
        window_size: Set(f.window_size),
        window_unit: Set(f.window_unit.clone()),
        window_delay: Set(f.window_delay),
        window_delay_unit: Set(f.window_delay_unit.clone()),
        explore_dimensions: Set(f.explore_dimensions.clone()),
        filters: Set(f.filters.clone()),
        data_filter: Set(serde_json::to_string(&f.data_filter)?),
        alert_filter: Set(serde_json::to_string(&f.alert_filter)?),
        merge_strategy: Set(f.merge_config.as_ref().map(|c| c.strategy.to_string())),
        merge_max_gap: Set(f.merge_config.as_ref().map(|c| c.max_gap_ms)),
        merge_max_duration: Set(f.merge_config.as_ref().map(|c| c.max_duration_ms)),
        global_metric: Set(f.global_metric.clone()),
        global_metric_filters: Set(f.global_metric_filters.clone()),
        created_by: Set(f.created_by.clone()),
        migrated_to: Set(f.migrated_to),
        created_at: NotSet,
        updated_at: NotSet,
    })
}

impl ConfigStore {
    /// 写入一条旧版异常检测函数。`id` 为 0 时自动分配。
    pub async fn insert_function(&self, row: &LegacyFunction) -> Result<LegacyFunction> {
        let now = Utc::now().fixed_offset();
        let mut am = to_active(row)?;
        if row.id == 0 {
            am.id = Set(ruleport_common::id::next_id());
        }
        am.created_at = Set(now);
        am.updated_at = Set(now);
        let model = am.insert(self.db()).await?;
        to_function(model)
    }

    pub async fn get_function_by_id(&self, id: i64) -> Result<Option<LegacyFunction>> {
        let model = Entity::find_by_id(id).one(self.db()).await?;
        model.map(to_function).transpose()
    }

    pub async fn list_all_functions(&self) -> Result<Vec<LegacyFunction>> {
        let rows = Entity::find()
            .order_by(Column::Id, Order::Asc)
            .all(self.db())
            .await?;
        rows.into_iter().map(to_function).collect()
    }

    /// 覆盖写回整条记录，返回受影响行数。
    pub async fn save_function(&self, row: &LegacyFunction) -> Result<u64> {
        let mut am = to_active(row)?;
        am.id = NotSet;
        am.updated_at = Set(Utc::now().fixed_offset());
        let res = Entity::update_many()
            .set(am)
            .filter(Column::Id.eq(row.id))
            .exec(self.db())
            .await?;
        Ok(res.rows_affected)
    }
}
