use crate::config::ServerConfig;
use chrono::{DateTime, Utc};
use ruleport_migrate::{MigrationOrchestrator, YamlConfigBuilder};
use ruleport_storage::ConfigStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ConfigStore>,
    pub orchestrator: Arc<MigrationOrchestrator>,
    pub start_time: DateTime<Utc>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(store: Arc<ConfigStore>, config: ServerConfig) -> Self {
        let orchestrator = MigrationOrchestrator::new(store.clone(), Arc::new(YamlConfigBuilder))
            .with_entity_locks(config.migration.lock_entities);
        Self {
            store,
            orchestrator: Arc::new(orchestrator),
            start_time: Utc::now(),
            config: Arc::new(config),
        }
    }
}
