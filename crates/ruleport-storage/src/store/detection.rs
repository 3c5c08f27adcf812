use chrono::Utc;
use ruleport_common::types::{
    DetectionConfig, NewDetectionConfig, NewSubscriptionConfig, SubscriptionConfig,
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::{NotSet, Set}, ColumnTrait, EntityTrait, Order, QueryFilter,
    QueryOrder,
};

use crate::entities::{detection_alert_config, detection_config};
use crate::error::{Result, StorageError};
use crate::store::ConfigStore;
use crate::SubscriptionFilter;

fn to_detection(m: detection_config::Model) -> DetectionConfig {
    DetectionConfig {
        id: m.id,
        name: m.name,
        description: m.description,
        active: m.active,
        yaml: m.yaml,
        created_by: m.created_by,
        created_at: m.created_at.with_timezone(&Utc),
        updated_at: m.updated_at.with_timezone(&Utc),
    }
}

fn to_subscription(m: detection_alert_config::Model) -> Result<SubscriptionConfig> {
    let detection_names: Vec<String> =
        serde_json::from_str(&m.detection_names).map_err(|e| StorageError::InvalidColumn {
            column: "detection_names",
            message: e.to_string(),
        })?;
    Ok(SubscriptionConfig {
        id: m.id,
        name: m.name,
        application: m.application,
        active: m.active,
        cron: m.cron,
        yaml: m.yaml,
        detection_names,
        created_by: m.created_by,
        created_at: m.created_at.with_timezone(&Utc),
        updated_at: m.updated_at.with_timezone(&Utc),
    })
}

impl ConfigStore {
    // ---- Detection configs ----

    pub async fn create_detection_config(
        &self,
        config: &NewDetectionConfig,
    ) -> Result<DetectionConfig> {
        let now = Utc::now().fixed_offset();
        let am = detection_config::ActiveModel {
            id: Set(ruleport_common::id::next_id()),
            name: Set(config.name.clone()),
            description: Set(config.description.clone()),
            active: Set(config.active),
            yaml: Set(config.yaml.clone()),
            created_by: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let model = am.insert(self.db()).await?;
        Ok(to_detection(model))
    }

    pub async fn save_detection_config(&self, config: &DetectionConfig) -> Result<u64> {
        let am = detection_config::ActiveModel {
            id: NotSet,
            name: Set(config.name.clone()),
            description: Set(config.description.clone()),
            active: Set(config.active),
            yaml: Set(config.yaml.clone()),
            created_by: Set(config.created_by.clone()),
            created_at: NotSet,
            updated_at: Set(Utc::now().fixed_offset()),
        };
        let res = detection_config::Entity::update_many()
            .set(am)
            .filter(detection_config::Column::Id.eq(config.id))
            .exec(self.db())
            .await?;
        Ok(res.rows_affected)
    }

    pub async fn get_detection_config_by_id(&self, id: i64) -> Result<Option<DetectionConfig>> {
        let model = detection_config::Entity::find_by_id(id)
            .one(self.db())
            .await?;
        Ok(model.map(to_detection))
    }

    pub async fn list_detection_configs(&self) -> Result<Vec<DetectionConfig>> {
        let rows = detection_config::Entity::find()
            .order_by(detection_config::Column::CreatedAt, Order::Asc)
            .all(self.db())
            .await?;
        Ok(rows.into_iter().map(to_detection).collect())
    }

    // ---- Subscription (detection alert) configs ----

    pub async fn create_subscription_config(
        &self,
        config: &NewSubscriptionConfig,
    ) -> Result<SubscriptionConfig> {
        let now = Utc::now().fixed_offset();
        let am = detection_alert_config::ActiveModel {
            id: Set(ruleport_common::id::next_id()),
            name: Set(config.name.clone()),
            application: Set(config.application.clone()),
            active: Set(config.active),
            cron: Set(config.cron.clone()),
            yaml: Set(config.yaml.clone()),
            detection_names: Set(serde_json::to_string(&config.detection_names)?),
            created_by: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let model = am.insert(self.db()).await?;
        to_subscription(model)
    }

    pub async fn save_subscription_config(&self, config: &SubscriptionConfig) -> Result<u64> {
        let am = detection_alert_config::ActiveModel {
            id: NotSet,
            name: Set(config.name.clone()),
            application: Set(config.application.clone()),
            active: Set(config.active),
            cron: Set(config.cron.clone()),
            yaml: Set(config.yaml.clone()),
            detection_names: Set(serde_json::to_string(&config.detection_names)?),
            created_by: Set(config.created_by.clone()),
            created_at: NotSet,
            updated_at: Set(Utc::now().fixed_offset()),
        };
        let res = detection_alert_config::Entity::update_many()
            .set(am)
            .filter(detection_alert_config::Column::Id.eq(config.id))
            .exec(self.db())
            .await?;
        Ok(res.rows_affected)
    }

    pub async fn list_subscription_configs(
        &self,
        filter: &SubscriptionFilter,
    ) -> Result<Vec<SubscriptionConfig>> {
        let mut q = detection_alert_config::Entity::find();
        if let Some(name) = &filter.name_eq {
            q = q.filter(detection_alert_config::Column::Name.eq(name.as_str()));
        }
        if let Some(application) = &filter.application_eq {
            q = q.filter(detection_alert_config::Column::Application.eq(application.as_str()));
        }
        let rows = q
            .order_by(detection_alert_config::Column::CreatedAt, Order::Asc)
            .all(self.db())
            .await?;
        rows.into_iter().map(to_subscription).collect()
    }
}
