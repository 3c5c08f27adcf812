use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "anomaly_functions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    pub function_name: String,
    pub active: bool,
    pub metric: String,
    pub collection: String,
    pub function_type: String,
    pub properties: String,
    pub bucket_size: i32,
    pub bucket_unit: String,
    pub window_size: i32,
    pub window_unit: String,
    pub window_delay: i32,
    pub window_delay_unit: String,
    pub explore_dimensions: Option<String>,
    pub filters: Option<String>,
    /// JSON object of string values
    pub data_filter: String,
    /// JSON object of string values
    pub alert_filter: String,
    pub merge_strategy: Option<String>,
    pub merge_max_gap: Option<i64>,
    pub merge_max_duration: Option<i64>,
    pub global_metric: Option<String>,
    pub global_metric_filters: Option<String>,
    pub created_by: Option<String>,
    pub migrated_to: Option<i64>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
