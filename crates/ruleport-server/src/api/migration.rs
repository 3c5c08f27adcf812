use crate::api::{migration_error_response, success_empty_response, success_response, ApiError};
use crate::logging::TraceId;
use crate::state::AppState;
use axum::extract::{Extension, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use ruleport_migrate::document::{to_yaml, Document};
use ruleport_migrate::ApplicationReport;
use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

/// 单个旧版检测函数的迁移结果
#[derive(Serialize, ToSchema)]
pub struct MigratedFunctionResponse {
    /// 新检测配置 ID
    pub id: i64,
}

fn yaml_response(trace_id: &str, document: &Document) -> Response {
    match to_yaml(document) {
        Ok(yaml) => (StatusCode::OK, [(header::CONTENT_TYPE, "text/yaml")], yaml).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to render document as YAML");
            crate::api::error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                trace_id,
                "internal_error",
                "Failed to render YAML",
            )
        }
    }
}

/// 预览旧版检测函数转换后的 YAML，不写入任何数据。
#[utoipa::path(
    get,
    path = "/migrate/legacy-anomaly-function-to-yaml/{id}",
    tag = "Migration",
    params(("id" = i64, Path, description = "旧版检测函数 ID")),
    responses(
        (status = 200, description = "转换后的检测配置 YAML", body = String, content_type = "text/yaml"),
        (status = 400, description = "检测函数不存在", body = ApiError)
    )
)]
async fn function_to_yaml(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    match state.orchestrator.function_document(id).await {
        Ok(document) => yaml_response(&trace_id, &document),
        Err(e) => migration_error_response(&trace_id, &e),
    }
}

/// 预览旧版告警订阅转换后的 YAML，不写入任何数据。
#[utoipa::path(
    get,
    path = "/migrate/legacy-alert-to-yaml/{id}",
    tag = "Migration",
    params(("id" = i64, Path, description = "旧版告警订阅 ID")),
    responses(
        (status = 200, description = "转换后的订阅配置 YAML", body = String, content_type = "text/yaml"),
        (status = 400, description = "告警订阅不存在", body = ApiError)
    )
)]
async fn alert_to_yaml(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    match state.orchestrator.alert_document(id).await {
        Ok(document) => yaml_response(&trace_id, &document),
        Err(e) => migration_error_response(&trace_id, &e),
    }
}

/// 迁移某个应用下的全部旧版告警订阅。
/// 全部成功时在 `err_msg` 中返回成功信息，否则 `data` 为按告警汇总的错误信息。
#[utoipa::path(
    post,
    path = "/migrate/application/{name}",
    tag = "Migration",
    params(("name" = String, Path, description = "应用名称")),
    responses(
        (status = 200, description = "迁移结果", body = BTreeMap<String, String>),
        (status = 500, description = "读取告警订阅失败", body = ApiError)
    )
)]
async fn migrate_application(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    match state.orchestrator.migrate_application(&name).await {
        Ok(ApplicationReport::Migrated(message)) => {
            success_empty_response(StatusCode::OK, &trace_id, &message)
        }
        Ok(ApplicationReport::Failed(report)) => {
            success_response(StatusCode::OK, &trace_id, report.errors())
        }
        Err(e) => migration_error_response(&trace_id, &e),
    }
}

/// 直接迁移单个旧版检测函数，返回新检测配置 ID。
#[utoipa::path(
    post,
    path = "/migrate/anomaly-function/{id}",
    tag = "Migration",
    params(("id" = i64, Path, description = "旧版检测函数 ID")),
    responses(
        (status = 200, description = "迁移成功", body = MigratedFunctionResponse),
        (status = 400, description = "校验失败", body = ApiError),
        (status = 500, description = "迁移失败", body = ApiError)
    )
)]
async fn migrate_function(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    match state.orchestrator.migrate_function(id).await {
        Ok(target_id) => success_response(
            StatusCode::OK,
            &trace_id,
            MigratedFunctionResponse { id: target_id },
        ),
        Err(e) => migration_error_response(&trace_id, &e),
    }
}

/// 迁移所有尚未迁移的旧版检测函数。
/// `data` 为按函数汇总的错误信息，为空表示全部成功。
#[utoipa::path(
    post,
    path = "/migrate/unsubscribed-anomaly-functions",
    tag = "Migration",
    responses(
        (status = 200, description = "迁移结果", body = BTreeMap<String, String>),
        (status = 500, description = "读取检测函数失败", body = ApiError)
    )
)]
async fn migrate_unsubscribed(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    match state.orchestrator.migrate_unsubscribed_functions().await {
        Ok(report) => success_response(StatusCode::OK, &trace_id, report.errors()),
        Err(e) => migration_error_response(&trace_id, &e),
    }
}

pub fn migration_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(function_to_yaml))
        .routes(routes!(alert_to_yaml))
        .routes(routes!(migrate_application))
        .routes(routes!(migrate_function))
        .routes(routes!(migrate_unsubscribed))
}
