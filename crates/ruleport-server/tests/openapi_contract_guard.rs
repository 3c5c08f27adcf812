mod common;

use anyhow::{anyhow, Result};
use common::{build_test_context, request_no_body, request_raw};
use std::collections::BTreeSet;

#[tokio::test]
async fn openapi_exposes_exactly_the_migration_surface() -> Result<()> {
    let ctx = build_test_context().await?;
    let (status, body, _) = request_no_body(&ctx.app, "GET", "/v1/openapi.json").await;
    assert_eq!(status, axum::http::StatusCode::OK);

    let Some(paths) = body["paths"].as_object() else {
        return Err(anyhow!("openapi paths should be object"));
    };

    let mut exposed: BTreeSet<String> = BTreeSet::new();
    for (path, methods) in paths {
        let Some(methods) = methods.as_object() else {
            return Err(anyhow!("path methods should be object for {path}"));
        };
        for method in methods.keys() {
            exposed.insert(format!("{} {path}", method.to_ascii_uppercase()));
        }
    }

    let expected: BTreeSet<String> = [
        "GET /v1/health",
        "GET /migrate/legacy-anomaly-function-to-yaml/{id}",
        "GET /migrate/legacy-alert-to-yaml/{id}",
        "POST /migrate/application/{name}",
        "POST /migrate/anomaly-function/{id}",
        "POST /migrate/unsubscribed-anomaly-functions",
    ]
    .into_iter()
    .map(|s| s.to_string())
    .collect();

    assert_eq!(exposed, expected);
    Ok(())
}

#[tokio::test]
async fn openapi_yaml_is_served() -> Result<()> {
    let ctx = build_test_context().await?;
    let resp = request_raw(&ctx.app, "GET", "/v1/openapi.yaml").await;
    assert_eq!(resp.status, axum::http::StatusCode::OK);
    assert_eq!(resp.content_type.as_deref(), Some("text/yaml"));
    assert!(resp.body.contains("/migrate/application/{name}"));
    Ok(())
}
