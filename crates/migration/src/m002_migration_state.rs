use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m002_migration_state"
    }
}

/// Adds an explicit `migrated_to` column to the legacy tables. Rows tagged
/// before this column existed are still recognised by their name suffix.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.get_connection().execute_unprepared(UP_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(DOWN_SQL)
            .await?;
        Ok(())
    }
}

const UP_SQL: &str = "
ALTER TABLE anomaly_functions ADD COLUMN migrated_to BIGINT;
ALTER TABLE alert_configs ADD COLUMN migrated_to BIGINT;
";

const DOWN_SQL: &str = "
ALTER TABLE alert_configs DROP COLUMN migrated_to;
ALTER TABLE anomaly_functions DROP COLUMN migrated_to;
";
