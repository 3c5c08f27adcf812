use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m001_initial_schema"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 按依赖顺序建表
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
CREATE TABLE IF NOT EXISTS dataset_configs (
    id BIGINT PRIMARY KEY NOT NULL,
    dataset TEXT NOT NULL UNIQUE,
    timezone TEXT NOT NULL DEFAULT 'UTC',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS metric_configs (
    id BIGINT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    dataset TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_metric_configs_name_dataset ON metric_configs(name, dataset);

CREATE TABLE IF NOT EXISTS anomaly_functions (
    id BIGINT PRIMARY KEY NOT NULL,
    function_name TEXT NOT NULL,
    active BOOLEAN NOT NULL DEFAULT 1,
    metric TEXT NOT NULL,
    collection TEXT NOT NULL,
    function_type TEXT NOT NULL,
    properties TEXT NOT NULL DEFAULT '',
    bucket_size INTEGER NOT NULL DEFAULT 1,
    bucket_unit TEXT NOT NULL DEFAULT 'DAYS',
    window_size INTEGER NOT NULL DEFAULT 1,
    window_unit TEXT NOT NULL DEFAULT 'DAYS',
    window_delay INTEGER NOT NULL DEFAULT 0,
    window_delay_unit TEXT NOT NULL DEFAULT 'HOURS',
    explore_dimensions TEXT,
    filters TEXT,
    data_filter TEXT NOT NULL DEFAULT '{}',
    alert_filter TEXT NOT NULL DEFAULT '{}',
    merge_strategy TEXT,
    merge_max_gap BIGINT,
    merge_max_duration BIGINT,
    global_metric TEXT,
    global_metric_filters TEXT,
    created_by TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_anomaly_functions_collection ON anomaly_functions(collection);

CREATE TABLE IF NOT EXISTS alert_configs (
    id BIGINT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    active BOOLEAN NOT NULL DEFAULT 1,
    application TEXT NOT NULL,
    cron_expression TEXT NOT NULL,
    subject_type TEXT NOT NULL DEFAULT 'ALERT',
    from_address TEXT NOT NULL,
    recipients TEXT NOT NULL DEFAULT '{}',
    function_ids TEXT NOT NULL DEFAULT '[]',
    created_by TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_alert_configs_application ON alert_configs(application);

CREATE TABLE IF NOT EXISTS detection_configs (
    id BIGINT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL UNIQUE,
    description TEXT NOT NULL DEFAULT '',
    active BOOLEAN NOT NULL DEFAULT 1,
    yaml TEXT NOT NULL,
    created_by TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS detection_alert_configs (
    id BIGINT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL UNIQUE,
    application TEXT NOT NULL,
    active BOOLEAN NOT NULL DEFAULT 1,
    cron TEXT NOT NULL,
    yaml TEXT NOT NULL,
    detection_names TEXT NOT NULL DEFAULT '[]',
    created_by TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS merged_anomalies (
    id BIGINT PRIMARY KEY NOT NULL,
    function_id BIGINT,
    detection_config_id BIGINT,
    metric TEXT NOT NULL,
    collection TEXT NOT NULL,
    start_time BIGINT NOT NULL,
    end_time BIGINT NOT NULL,
    properties TEXT NOT NULL DEFAULT '{}',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_merged_anomalies_function_id ON merged_anomalies(function_id);
CREATE INDEX IF NOT EXISTS idx_merged_anomalies_detection_config_id ON merged_anomalies(detection_config_id);
";

const DOWN_SQL: &str = "
DROP TABLE IF EXISTS merged_anomalies;
DROP TABLE IF EXISTS detection_alert_configs;
DROP TABLE IF EXISTS detection_configs;
DROP TABLE IF EXISTS alert_configs;
DROP TABLE IF EXISTS anomaly_functions;
DROP TABLE IF EXISTS metric_configs;
DROP TABLE IF EXISTS dataset_configs;
";
