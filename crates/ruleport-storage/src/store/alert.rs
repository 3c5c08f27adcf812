use chrono::Utc;
use ruleport_common::types::{LegacyAlert, Recipients};
use sea_orm::{
    ActiveValue::{NotSet, Set},
    ActiveModelTrait, ColumnTrait, EntityTrait, Order, QueryFilter, QueryOrder,
};

use crate::entities::alert_config::{self, Column, Entity};
use crate::error::{Result, StorageError};
use crate::store::ConfigStore;
use crate::AlertFilter;

fn to_alert(m: alert_config::Model) -> Result<LegacyAlert> {
    let recipients: Recipients = if m.recipients.trim().is_empty() {
        Recipients::default()
    } else {
        serde_json::from_str(&m.recipients).map_err(|e| StorageError::InvalidColumn {
            column: "recipients",
            message: e.to_string(),
        })?
    };
    let function_ids: Vec<i64> = if m.function_ids.trim().is_empty() {
        Vec::new()
    } else {
        serde_json::from_str(&m.function_ids).map_err(|e| StorageError::InvalidColumn {
            column: "function_ids",
            message: e.to_string(),
        })?
    };
    Ok(LegacyAlert {
        id: m.id,
        name: m.name,
        active: m.active,
        application: m.application,
        cron_expression: m.cron_expression,
        subject_type: m.subject_type,
        from_address: m.from_address,
        recipients,
        function_ids,
        created_by: m.created_by,
        migrated_to: m.migrated_to,
    })
}

fn to_active(a: &LegacyAlert) -> Result<alert_config::ActiveModel> {
    Ok(alert_config::ActiveModel {
        id: Set(a.id),
        name: Set(a.name.clone()),
        active: Set(a.active),
        application: Set(a.application.clone()),
        cron_expression: Set(a.cron_expression.clone()),
        subject_type: Set(a.subject_type.clone()),
        from_address: Set(a.from_address.clone()),
        recipients: Set(serde_json::to_string(&a.recipients)?),
        function_ids: Set(serde_json::to_string(&a.function_ids)?),
        created_by: Set(a.created_by.clone()),
        migrated_to: Set(a.migrated_to),
        created_at: NotSet,
        updated_at: NotSet,
    })
}

impl ConfigStore {
    /// 写入一条旧版告警订阅。`id` 为 0 时自动分配。
    pub async fn insert_alert(&self, row: &LegacyAlert) -> Result<LegacyAlert> {
        let now = Utc::now().fixed_offset();
        let mut am = to_active(row)?;
        if row.id == 0 {
            am.id = Set(ruleport_common::id::next_id());
        }
        am.created_at = Set(now);
        am.updated_at = Set(now);
        let model = am.insert(self.db()).await?;
        to_alert(model)
    }

    pub async fn get_alert_by_id(&self, id: i64) -> Result<Option<LegacyAlert>> {
        let model = Entity::find_by_id(id).one(self.db()).await?;
        model.map(to_alert).transpose()
    }

    pub async fn list_alerts_by(&self, filter: &AlertFilter) -> Result<Vec<LegacyAlert>> {
        let mut q = Entity::find();
        if let Some(application) = &filter.application_eq {
            q = q.filter(Column::Application.eq(application.as_str()));
        }
        if let Some(name) = &filter.name_eq {
            q = q.filter(Column::Name.eq(name.as_str()));
        }
        let rows = q.order_by(Column::Id, Order::Asc).all(self.db()).await?;
        rows.into_iter().map(to_alert).collect()
    }

    pub async fn save_alert(&self, row: &LegacyAlert) -> Result<u64> {
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
