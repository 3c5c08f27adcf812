use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "alert_configs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    pub name: String,
    pub active: bool,
    pub application: String,
    pub cron_expression: String,
    pub subject_type: String,
    pub from_address: String,
    /// JSON: {"to": [...], "cc": [...], "bcc": [...]}
    pub recipients: String,
    /// JSON array of anomaly function ids
    pub function_ids: String,
    pub created_by: Option<String>,
    pub migrated_to: Option<i64>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
