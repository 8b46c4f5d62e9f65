use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use crate::api::client::HttpDocumentStore;
use crate::core::config::{BackendConfig, BackendKind, Config};
use crate::metrics::collector::Metrics;
use crate::moderation::controller::ModerationController;
use crate::stores::document_store::DocumentStore;
use crate::stores::memory_store::MemoryStore;

/// Build the document store selected in the config
pub fn build_store(config: &BackendConfig) -> Result<Arc<dyn DocumentStore>> {
    match config.kind {
        BackendKind::Http => {
            let store = HttpDocumentStore::new(
                &config.endpoint,
                config.api_key.clone(),
                config.connect_timeout(),
            )
            .context("Failed to create document store client")?;

            info!(endpoint = %config.endpoint, "Using HTTP document store");
            Ok(Arc::new(store))
        }
        BackendKind::Memory => {
            let store = match &config.seed_file {
                Some(path) => MemoryStore::from_seed_file(path)?,
                None => MemoryStore::new(),
            };

            info!(
                seed_file = ?config.seed_file,
                groups = store.records(&config.groups_collection).len(),
                users = store.records(&config.users_collection).len(),
                "Using in-memory document store"
            );
            Ok(Arc::new(store))
        }
    }
}

/// Open both collection subscriptions
pub async fn open_controller(
    config: &Config,
    store: Arc<dyn DocumentStore>,
    metrics: Arc<Metrics>,
) -> Result<ModerationController> {
    let settings = config.controller_settings();

    let controller = ModerationController::open(store, settings, metrics)
        .await
        .context("Failed to subscribe to moderated collections")?;

    info!(
        groups_collection = %config.backend.groups_collection,
        users_collection = %config.backend.users_collection,
        conditional_ban_writes = config.moderation.conditional_ban_writes,
        "Moderation controller started"
    );

    Ok(controller)
}
