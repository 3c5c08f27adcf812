#![allow(dead_code)]

use anyhow::Result;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use ruleport_common::types::{HistoricalResult, LegacyAlert, LegacyFunction, Recipients};
use ruleport_server::app;
use ruleport_server::config::{DatabaseConfig, ServerConfig};
use ruleport_server::state::AppState;
use ruleport_storage::ConfigStore;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;

pub struct TestContext {
    pub temp_dir: TempDir,
    pub state: AppState,
    pub app: axum::Router,
}

impl TestContext {
    pub fn store(&self) -> &ConfigStore {
        &self.state.store
    }
}

pub async fn build_test_context() -> Result<TestContext> {
    ruleport_common::id::init(1, 1);

    let temp_dir = tempfile::tempdir()?;
    let config = ServerConfig {
        database: DatabaseConfig {
            url: None,
            data_dir: temp_dir.path().to_string_lossy().to_string(),
        },
        ..Default::default()
    };
    let store = Arc::new(ConfigStore::connect(&config.database.connection_url()).await?);
    store.insert_dataset("web_traffic", "UTC").await?;
    store.insert_metric("page_views", "web_traffic").await?;

    let state = AppState::new(store, config);
    let app = app::build_http_app(state.clone());

    Ok(TestContext {
        temp_dir,
        state,
        app,
    })
}

pub fn legacy_function(name: &str, metric: &str) -> LegacyFunction {
    LegacyFunction {
        id: 0,
        function_name: name.to_string(),
        active: true,
        metric: metric.to_string(),
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
        alert_filter: BTreeMap::new(),
        merge_config: None,
        global_metric: None,
        global_metric_filters: None,
        created_by: Some("owner@example.com".to_string()),
        migrated_to: None,
    }
}

pub async fn seed_function(ctx: &TestContext, name: &str, metric: &str) -> LegacyFunction {
    ctx.store()
        .insert_function(&legacy_function(name, metric))
        .await
        .expect("function should insert")
}

pub async fn seed_alert(
    ctx: &TestContext,
    name: &str,
    application: &str,
    function_ids: Vec<i64>,
) -> LegacyAlert {
    ctx.store()
        .insert_alert(&LegacyAlert {
            id: 0,
            name: name.to_string(),
            active: true,
            application: application.to_string(),
            cron_expression: "0 0 14 * * ? *".to_string(),
            subject_type: "ALERT".to_string(),
            from_address: "alerts@example.com".to_string(),
            recipients: Recipients {
                to: vec!["team@example.com".to_string()],
                ..Default::default()
            },
            function_ids,
            created_by: None,
            migrated_to: None,
        })
        .await
        .expect("alert should insert")
}

pub async fn seed_result(ctx: &TestContext, function_id: i64) -> HistoricalResult {
    let mut properties = serde_json::Map::new();
    properties.insert("anomalyTimelinesView".to_string(), Value::String("{}".to_string()));
    ctx.store()
        .insert_historical_result(&HistoricalResult {
            id: 0,
            function_id: Some(function_id),
            detection_config_id: None,
            metric: "page_views".to_string(),
            collection: "web_traffic".to_string(),
            start_time: 0,
            end_time: 3_600_000,
            properties,
        })
        .await
        .expect("result should insert")
}

pub struct RawResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub trace_id: Option<String>,
    pub body: String,
}

pub async fn request_raw(app: &axum::Router, method: &str, uri: &str) -> RawResponse {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request should build");

    let resp = app
        .clone()
        .oneshot(req)
        .await
        .expect("request should be handled");

    let status = resp.status();
    let header = |name: &str| {
        resp.headers()
            .get(name)
            .and_then(|h| h.to_str().ok())
            .map(|s| s.to_string())
    };
    let content_type = header("content-type");
    let trace_id = header("x-trace-id");
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body should read");

    RawResponse {
        status,
        content_type,
        trace_id,
        body: String::from_utf8_lossy(&bytes).to_string(),
    }
}

pub async fn request_no_body(
    app: &axum::Router,
    method: &str,
    uri: &str,
) -> (StatusCode, Value, Option<String>) {
    let raw = request_raw(app, method, uri).await;
    let json = if raw.body.is_empty() {
        Value::Null
    } else {
        serde_json::from_str::<Value>(&raw.body).unwrap_or(Value::String(raw.body))
    };
    (raw.status, json, raw.trace_id)
}

pub fn assert_ok_envelope(json: &Value) {
    assert_eq!(json["err_code"], 0);
    assert!(json["err_msg"].is_string());
    assert!(json.get("trace_id").is_some());
}

pub fn assert_err_envelope(json: &Value, err_code: i32) {
    assert_eq!(json["err_code"], err_code);
    assert!(json["err_msg"].is_string());
    assert!(json.get("trace_id").is_some());
    assert!(json.get("data").is_some());
    assert!(json["data"].is_null());
}
