mod common;

use axum::http::StatusCode;
use common::{
    assert_err_envelope, assert_ok_envelope, build_test_context, request_no_body, request_raw,
    seed_alert, seed_function, seed_result,
};
use ruleport_storage::{HistoricalResultFilter, LegacyConfigStore};

#[tokio::test]
async fn health_reports_store_status() {
    let ctx = build_test_context().await.unwrap();
    let (status, body, trace_id) = request_no_body(&ctx.app, "GET", "/v1/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_ok_envelope(&body);
    assert_eq!(body["data"]["storage_status"], "ok");
    assert_eq!(body["data"]["detection_config_count"], 0);
    let trace_id = trace_id.expect("trace id header");
    assert_eq!(trace_id.len(), 16);
    assert_eq!(body["trace_id"], trace_id.as_str());
}

#[tokio::test]
async fn function_yaml_dump_does_not_mutate() {
    let ctx = build_test_context().await.unwrap();
    let function = seed_function(&ctx, "pv_wow", "page_views").await;

    let resp = request_raw(
        &ctx.app,
        "GET",
        &format!("/migrate/legacy-anomaly-function-to-yaml/{}", function.id),
    )
    .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.content_type.as_deref(), Some("text/yaml"));
    assert!(resp.body.starts_with("detectionName: pv_wow\n"));
    assert!(resp.body.contains("type: PERCENTAGE_RULE"));
    assert!(resp.body.contains("pattern: DOWN"));

    let stored = ctx.store().get_function(function.id).await.unwrap().unwrap();
    assert_eq!(stored, function);
    assert!(ctx.store().list_detection_configs().await.unwrap().is_empty());
}

#[tokio::test]
async fn yaml_dump_of_unknown_ids_is_bad_request() {
    let ctx = build_test_context().await.unwrap();

    let (status, body, _) =
        request_no_body(&ctx.app, "GET", "/migrate/legacy-anomaly-function-to-yaml/404").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_err_envelope(&body, 1004);
    assert_eq!(body["err_msg"], "Legacy Anomaly function cannot be found for id 404");

    let (status, body, _) = request_no_body(&ctx.app, "GET", "/migrate/legacy-alert-to-yaml/404").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["err_msg"], "Legacy alert cannot be found for id 404");
}

#[tokio::test]
async fn alert_yaml_lists_referenced_functions() {
    let ctx = build_test_context().await.unwrap();
    let function = seed_function(&ctx, "pv_wow", "page_views").await;
    let alert = seed_alert(&ctx, "growth daily", "growth", vec![function.id, 999]).await;

    let resp = request_raw(&ctx.app, "GET", &format!("/migrate/legacy-alert-to-yaml/{}", alert.id)).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.starts_with("subscriptionGroupName: growth daily\n"));
    assert!(resp.body.contains("type: DEFAULT_ALERTER_PIPELINE"));
    assert!(resp.body.contains("detectionName:\n- pv_wow\n"));
}

#[tokio::test]
async fn migrate_function_returns_target_id_and_is_idempotent() {
    let ctx = build_test_context().await.unwrap();
    let function = seed_function(&ctx, "pv_wow", "page_views").await;
    seed_result(&ctx, function.id).await;
    let uri = format!("/migrate/anomaly-function/{}", function.id);

    let (status, body, _) = request_no_body(&ctx.app, "POST", &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_ok_envelope(&body);
    let target_id = body["data"]["id"].as_i64().expect("target id");

    let repointed = ctx
        .store()
        .count_historical_results(&HistoricalResultFilter {
            detection_config_id_eq: Some(target_id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(repointed, 1);

    let (status, body, _) = request_no_body(&ctx.app, "POST", &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"].as_i64(), Some(target_id));
    assert_eq!(ctx.store().list_detection_configs().await.unwrap().len(), 1);
}

#[tokio::test]
async fn migrate_function_validation_failure_is_bad_request() {
    let ctx = build_test_context().await.unwrap();
    let function = seed_function(&ctx, "orphan", "unknown_metric").await;

    let (status, body, _) = request_no_body(
        &ctx.app,
        "POST",
        &format!("/migrate/anomaly-function/{}", function.id),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_err_envelope(&body, 1010);
    assert_eq!(
        body["err_msg"],
        format!("Metric cannot be found for anomaly function {}", function.id)
    );
}

#[tokio::test]
async fn migrate_function_translation_failure_is_server_error() {
    let ctx = build_test_context().await.unwrap();
    let mut function = common::legacy_function("broken", "page_views");
    function.properties = "baseline=w/w".to_string();
    let function = ctx.store().insert_function(&function).await.unwrap();

    let (status, body, _) = request_no_body(
        &ctx.app,
        "POST",
        &format!("/migrate/anomaly-function/{}", function.id),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_err_envelope(&body, 1201);
}

#[tokio::test]
async fn migrate_empty_application_returns_success_text() {
    let ctx = build_test_context().await.unwrap();
    let (status, body, _) = request_no_body(&ctx.app, "POST", "/migrate/application/nobody").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["err_code"], 0);
    assert_eq!(body["err_msg"], "Application nobody has been successfully migrated");
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn migrate_application_reports_partial_failures() {
    let ctx = build_test_context().await.unwrap();
    let good = seed_function(&ctx, "pv_wow", "page_views").await;
    let bad = seed_function(&ctx, "orphan", "unknown_metric").await;
    let alert = seed_alert(&ctx, "growth daily", "growth", vec![good.id, bad.id]).await;

    let (status, body, _) = request_no_body(&ctx.app, "POST", "/migrate/application/growth").await;
    assert_eq!(status, StatusCode::OK);
    assert_ok_envelope(&body);
    let message = body["data"][format!("Status of alert {}", alert.id)]
        .as_str()
        .expect("per-alert entry");
    assert!(message.contains("anomalyFailureCount 0 and anomalyWarningCount 1"));

    // tagged even though it is reported as failed
    let stored = ctx.store().get_alert(alert.id).await.unwrap().unwrap();
    assert!(!stored.active);
    assert_eq!(stored.function_ids, vec![good.id]);
    assert!(stored.migrated_to.is_some());
}

#[tokio::test]
async fn unsubscribed_sweep_returns_error_map() {
    let ctx = build_test_context().await.unwrap();
    seed_function(&ctx, "pv_wow", "page_views").await;
    let bad = seed_function(&ctx, "orphan", "unknown_metric").await;

    let (status, body, _) =
        request_no_body(&ctx.app, "POST", "/migrate/unsubscribed-anomaly-functions").await;
    assert_eq!(status, StatusCode::OK);
    assert_ok_envelope(&body);
    let errors = body["data"].as_object().expect("error map");
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[&format!("Failed to migrate {}", bad.id)],
        format!("Validation Error : Metric cannot be found for anomaly function {}", bad.id)
    );

    let (_, body, _) =
        request_no_body(&ctx.app, "POST", "/migrate/unsubscribed-anomaly-functions").await;
    assert_eq!(body["data"].as_object().map(|m| m.len()), Some(1));
    assert_eq!(ctx.store().list_detection_configs().await.unwrap().len(), 1);
}
