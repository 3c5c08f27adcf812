use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;
use utoipa::openapi::OpenApi;

/// Serves the merged OpenAPI document as YAML and JSON.
pub fn spec_routes(spec: Arc<OpenApi>) -> Router {
    let json_spec = spec.clone();
    Router::new()
        .route(
            "/v1/openapi.yaml",
            get(move || {
                let spec = spec.clone();
                async move { openapi_yaml(&spec) }
            }),
        )
        .route(
            "/v1/openapi.json",
            get(move || {
                let spec = json_spec.clone();
                async move { Json(spec.as_ref().clone()) }
            }),
        )
}

fn openapi_yaml(spec: &OpenApi) -> Response {
    match serde_yaml::to_string(spec) {
        Ok(yaml) => (StatusCode::OK, [(header::CONTENT_TYPE, "text/yaml")], yaml).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to serialize YAML: {e}"),
        )
            .into_response(),
    }
}
