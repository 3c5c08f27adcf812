use anyhow::Result;
use ruleport_migrate::ApplicationReport;
use ruleport_storage::ConfigStore;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use ruleport_server::app;
use ruleport_server::config::ServerConfig;
use ruleport_server::state::AppState;

#[allow(clippy::print_stderr)]
fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  ruleport-server [config.toml]                                  Start the server");
    eprintln!("  ruleport-server migrate-application <config.toml> <name>      Migrate every alert of an application");
    eprintln!("  ruleport-server migrate-function <config.toml> <id>           Migrate one anomaly function");
    eprintln!("  ruleport-server migrate-unsubscribed <config.toml>            Migrate every function not yet migrated");
}

#[tokio::main]
async fn main() -> Result<()> {
    ruleport_common::id::init(1, 1);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("ruleport=info".parse()?))
        .init();

    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        Some("migrate-application") => {
            let config_path = args.get(2).ok_or_else(|| {
                print_usage();
                anyhow::anyhow!("migrate-application requires <config.toml> and <name> arguments")
            })?;
            let application = args.get(3).ok_or_else(|| {
                print_usage();
                anyhow::anyhow!("migrate-application requires <name> argument")
            })?;
            run_migrate_application(config_path, application).await
        }
        Some("migrate-function") => {
            let config_path = args.get(2).ok_or_else(|| {
                print_usage();
                anyhow::anyhow!("migrate-function requires <config.toml> and <id> arguments")
            })?;
            let id = args
                .get(3)
                .ok_or_else(|| {
                    print_usage();
                    anyhow::anyhow!("migrate-function requires <id> argument")
                })?
                .parse::<i64>()
                .map_err(|e| anyhow::anyhow!("Invalid function id: {e}"))?;
            run_migrate_function(config_path, id).await
        }
        Some("migrate-unsubscribed") => {
            let config_path = args.get(2).ok_or_else(|| {
                print_usage();
                anyhow::anyhow!("migrate-unsubscribed requires <config.toml> argument")
            })?;
            run_migrate_unsubscribed(config_path).await
        }
        Some("--help" | "-h") => {
            print_usage();
            Ok(())
        }
        _ => {
            let config_path = args
                .get(1)
                .map(|s| s.as_str())
                .unwrap_or("config/server.toml");
            run_server(config_path).await
        }
    }
}

async fn open_state(config_path: &str) -> Result<AppState> {
    let config = ServerConfig::load(config_path)?;
    if config.database.url.is_none() {
        std::fs::create_dir_all(Path::new(&config.database.data_dir)).map_err(|e| {
            anyhow::anyhow!(
                "Failed to create data dir '{}': {e}",
                config.database.data_dir
            )
        })?;
    }
    let store = Arc::new(ConfigStore::connect(&config.database.connection_url()).await?);
    Ok(AppState::new(store, config))
}

#[allow(clippy::print_stdout)]
fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run_migrate_application(config_path: &str, application: &str) -> Result<()> {
    let state = open_state(config_path).await?;
    let report = state.orchestrator.migrate_application(application).await?;
    if let ApplicationReport::Failed(errors) = &report {
        tracing::warn!(application, failed = errors.len(), "[MIG] Application migrated with failures");
    }
    print_json(&report)
}

async fn run_migrate_function(config_path: &str, id: i64) -> Result<()> {
    let state = open_state(config_path).await?;
    let target_id = state.orchestrator.migrate_function(id).await?;
    print_json(&serde_json::json!({ "id": target_id }))
}

async fn run_migrate_unsubscribed(config_path: &str) -> Result<()> {
    let state = open_state(config_path).await?;
    let report = state.orchestrator.migrate_unsubscribed_functions().await?;
    tracing::info!(failed = report.len(), "[MIG] Unsubscribed function sweep finished");
    print_json(&report)
}

async fn run_server(config_path: &str) -> Result<()> {
    let state = open_state(config_path).await?;
    let config = state.config.clone();

    tracing::info!(
        http_port = config.http_port,
        db = %config.database.redacted_url(),
        lock_entities = config.migration.lock_entities,
        "ruleport-server starting"
    );

    let http_addr: SocketAddr = format!("0.0.0.0:{}", config.http_port).parse()?;
    let app = app::build_http_app(state);
    let http_listener = tokio::net::TcpListener::bind(http_addr).await?;

    tracing::info!(http = %http_addr, "Server started");

    axum::serve(http_listener, app)
        .with_graceful_shutdown(async {
            signal::ctrl_c().await.ok();
        })
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
