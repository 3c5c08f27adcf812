use crate::state::AppState;
use crate::{api, logging, openapi};
use axum::middleware;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "ruleport API",
        description = "旧版检测函数与告警订阅迁移 REST API",
    ),
    tags(
        (name = "Health", description = "服务健康检查"),
        (name = "Migration", description = "旧版配置迁移")
    )
)]
struct ApiDoc;

pub fn build_http_app(state: AppState) -> Router {
    let (health_router, health_spec) = api::health_routes().split_for_parts();
    let (migration_router, migration_spec) = api::migration::migration_routes().split_for_parts();

    let mut merged_spec = ApiDoc::openapi();
    merged_spec.merge(health_spec);
    merged_spec.merge(migration_spec);
    let spec = Arc::new(merged_spec);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    health_router
        .merge(migration_router)
        .with_state(state)
        .merge(openapi::spec_routes(spec))
        .layer(cors)
        .layer(middleware::from_fn(logging::request_logging))
}
