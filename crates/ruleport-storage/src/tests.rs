use crate::store::ConfigStore;
use crate::{
    AlertFilter, HistoricalResultFilter, LegacyConfigStore, MetricFilter, SubscriptionFilter,
};
use ruleport_common::types::{
    HistoricalResult, LegacyAlert, LegacyFunction, MergeConfig, MergeStrategy,
    NewDetectionConfig, NewSubscriptionConfig, Recipients,
};
use serde_json::json;
use std::collections::BTreeMap;
use tempfile::TempDir;

async fn setup() -> (TempDir, ConfigStore) {
    ruleport_common::id::init(1, 1);
    let dir = TempDir::new().unwrap();
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());
    let store = ConfigStore::connect(&url).await.unwrap();
    (dir, store)
}

fn make_function(name: &str) -> LegacyFunction {
    let mut alert_filter = BTreeMap::new();
    alert_filter.insert("thresholdField".to_string(), "weight".to_string());
    alert_filter.insert("maxThreshold".to_string(), "-0.5".to_string());
    LegacyFunction {
        id: 0,
        function_name: name.to_string(),
        active: true,
        metric: "page_views".to_string(),
        collection: "web_traffic".to_string(),
        function_type: "WEEK_OVER_WEEK_RULE".to_string(),
        properties: "changeThreshold=-0.2".to_string(),
        bucket_size: 1,
        bucket_unit: "HOURS".to_string(),
        window_size: 1,
        window_unit: "DAYS".to_string(),
        window_delay: 0,
        window_delay_unit: "HOURS".to_string(),
        explore_dimensions: None,
        filters: Some("country=us".to_string()),
        data_filter: BTreeMap::new(),
        alert_filter,
        merge_config: Some(MergeConfig {
            strategy: MergeStrategy::FunctionDimensions,
            max_gap_ms: 7_200_000,
            max_duration_ms: 86_400_000,
        }),
        global_metric: None,
        global_metric_filters: None,
        created_by: Some("owner@example.com".to_string()),
        migrated_to: None,
    }
}

#[tokio::test]
async fn function_round_trips_through_store() {
    let (_dir, store) = setup().await;
    let inserted = store.insert_function(&make_function("pv_wow")).await.unwrap();
    assert!(inserted.id > 0);

    let loaded = store.get_function(inserted.id).await.unwrap().unwrap();
    assert_eq!(loaded, inserted);
    assert_eq!(loaded.alert_filter.get("maxThreshold").map(String::as_str), Some("-0.5"));
    assert_eq!(
        loaded.merge_config.as_ref().map(|c| c.strategy),
        Some(MergeStrategy::FunctionDimensions)
    );
}

#[tokio::test]
async fn update_reports_affected_rows() {
    let (_dir, store) = setup().await;
    let mut function = store.insert_function(&make_function("pv_wow")).await.unwrap();

    function.active = false;
    function.migrated_to = Some(42);
    assert_eq!(store.update_function(&function).await.unwrap(), 1);
    let loaded = store.get_function(function.id).await.unwrap().unwrap();
    assert!(!loaded.active);
    assert_eq!(loaded.migrated_to, Some(42));

    function.id = 1;
    assert_eq!(store.update_function(&function).await.unwrap(), 0);
}

#[tokio::test]
async fn alerts_filter_by_application() {
    let (_dir, store) = setup().await;
    for (name, app) in [("a1", "growth"), ("a2", "growth"), ("a3", "ads")] {
        store
            .insert_alert(&LegacyAlert {
                id: 0,
                name: name.to_string(),
                active: true,
                application: app.to_string(),
                cron_expression: "0 0 14 * * ? *".to_string(),
                subject_type: "ALERT".to_string(),
                from_address: "alerts@example.com".to_string(),
                recipients: Recipients {
                    to: vec!["team@example.com".to_string()],
                    ..Default::default()
                },
                function_ids: vec![1, 2],
                created_by: None,
                migrated_to: None,
            })
            .await
            .unwrap();
    }

    let growth = store
        .list_alerts(&AlertFilter {
            application_eq: Some("growth".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(growth.len(), 2);
    assert_eq!(growth[0].function_ids, vec![1, 2]);
    assert!(growth[0].recipients.cc.is_empty());
}

#[tokio::test]
async fn metric_lookup_requires_both_name_and_dataset() {
    let (_dir, store) = setup().await;
    store.insert_dataset("web_traffic", "America/Los_Angeles").await.unwrap();
    store.insert_metric("page_views", "web_traffic").await.unwrap();

    let hit = store
        .find_metrics(&MetricFilter::named("page_views", "web_traffic"))
        .await
        .unwrap();
    assert_eq!(hit.len(), 1);
    let miss = store
        .find_metrics(&MetricFilter::named("page_views", "mobile_traffic"))
        .await
        .unwrap();
    assert!(miss.is_empty());

    let datasets = store.find_datasets("web_traffic").await.unwrap();
    assert_eq!(datasets[0].timezone, "America/Los_Angeles");
}

#[tokio::test]
async fn detection_config_owner_patch() {
    let (_dir, store) = setup().await;
    let mut created = store
        .insert_detection_config(&NewDetectionConfig {
            name: "pv_wow".to_string(),
            description: "".to_string(),
            active: true,
            yaml: "detectionName: pv_wow\n".to_string(),
        })
        .await
        .unwrap();
    assert!(created.created_by.is_none());

    created.created_by = Some("owner@example.com".to_string());
    assert_eq!(store.update_detection_config(&created).await.unwrap(), 1);
    let loaded = store.get_detection_config_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(loaded.created_by.as_deref(), Some("owner@example.com"));
}

#[tokio::test]
async fn subscription_lookup_by_name() {
    let (_dir, store) = setup().await;
    store
        .insert_subscription_config(&NewSubscriptionConfig {
            name: "growth daily".to_string(),
            application: "growth".to_string(),
            active: true,
            cron: "0 0 14 * * ? *".to_string(),
            yaml: "subscriptionGroupName: growth daily\n".to_string(),
            detection_names: vec!["pv_wow".to_string()],
        })
        .await
        .unwrap();

    let found = store
        .find_subscription_configs(&SubscriptionFilter {
            name_eq: Some("growth daily".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].detection_names, vec!["pv_wow".to_string()]);
}

#[tokio::test]
async fn historical_results_filter_and_update() {
    let (_dir, store) = setup().await;
    let mut properties = serde_json::Map::new();
    properties.insert("anomalyTimelinesView".to_string(), json!("{...}"));
    let inserted = store
        .insert_historical_result(&HistoricalResult {
            id: 0,
            function_id: Some(7),
            detection_config_id: None,
            metric: "page_views".to_string(),
            collection: "web_traffic".to_string(),
            start_time: 1_000,
            end_time: 2_000,
            properties,
        })
        .await
        .unwrap();

    let by_function = HistoricalResultFilter {
        function_id_eq: Some(7),
        ..Default::default()
    };
    let mut rows = store.find_historical_results(&by_function).await.unwrap();
    assert_eq!(rows.len(), 1);

    let row = &mut rows[0];
    row.properties.remove("anomalyTimelinesView");
    row.detection_config_id = Some(99);
    assert_eq!(store.update_historical_result(row).await.unwrap(), 1);

    let by_detection = HistoricalResultFilter {
        detection_config_id_eq: Some(99),
        ..Default::default()
    };
    assert_eq!(store.count_historical_results(&by_detection).await.unwrap(), 1);
    let loaded = store.find_historical_results(&by_detection).await.unwrap();
    assert_eq!(loaded[0].id, inserted.id);
    assert!(!loaded[0].properties.contains_key("anomalyTimelinesView"));
}
