// Shared test doubles

use crate::core::config::{
    AdminConfig, BackendConfig, BackendKind, Config, LoggingConfig, ModerationConfig, ServerConfig,
};
use crate::core::error::StoreError;
use crate::core::state::AppState;
use crate::metrics::collector::Metrics;
use crate::models::record::Document;
use crate::moderation::confirm::{ConfirmationPrompt, Confirmer};
use crate::moderation::controller::ModerationController;
use crate::stores::document_store::{DocumentStore, Precondition, SnapshotStream};
use crate::stores::memory_store::MemoryStore;
use crate::sync::collection_sync::CollectionSync;
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum WriteCall {
    Delete {
        collection: String,
        id: String,
    },
    Update {
        collection: String,
        id: String,
        fields: Map<String, Value>,
        precondition: Option<Precondition>,
    },
}

/// Memory store that records every write request it receives
pub struct RecordingStore {
    inner: MemoryStore,
    calls: Mutex<Vec<WriteCall>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    pub fn calls(&self) -> Vec<WriteCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentStore for RecordingStore {
    async fn subscribe(&self, collection: &str) -> Result<SnapshotStream, StoreError> {
        self.inner.subscribe(collection).await
    }

    async fn delete_record(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.calls.lock().unwrap().push(WriteCall::Delete {
            collection: collection.to_string(),
            id: id.to_string(),
        });
        self.inner.delete_record(collection, id).await
    }

    async fn update_fields(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
        precondition: Option<Precondition>,
    ) -> Result<(), StoreError> {
        self.calls.lock().unwrap().push(WriteCall::Update {
            collection: collection.to_string(),
            id: id.to_string(),
            fields: fields.clone(),
            precondition: precondition.clone(),
        });
        self.inner.update_fields(collection, id, fields, precondition).await
    }
}

/// Confirmer with a fixed answer that remembers which prompts it was shown
pub struct ScriptedConfirmer {
    answer: bool,
    prompts: Mutex<Vec<ConfirmationPrompt>>,
}

impl ScriptedConfirmer {
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<ConfirmationPrompt> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Confirmer for ScriptedConfirmer {
    async fn confirm(&self, prompt: ConfirmationPrompt) -> bool {
        self.prompts.lock().unwrap().push(prompt);
        self.answer
    }
}

/// Wait until `sync` has received at least `generation` deliveries
pub async fn wait_for_generation<T>(sync: &CollectionSync<T>, generation: u64)
where
    T: Document + Send + Sync + 'static,
{
    let mut rx = sync.cache().watch();
    tokio::time::timeout(Duration::from_secs(1), rx.wait_for(|s| s.generation >= generation))
        .await
        .expect("timed out waiting for snapshot")
        .expect("snapshot cache dropped");
}

pub fn create_test_config() -> Config {
    Config {
        server: ServerConfig {
            port: 8080,
            num_threads: 1,
        },
        backend: BackendConfig {
            kind: BackendKind::Memory,
            endpoint: String::new(),
            api_key: String::new(),
            groups_collection: "groups".to_string(),
            users_collection: "users".to_string(),
            connect_timeout: 10,
            seed_file: None,
        },
        admin: AdminConfig {
            api_key: "test-api-key".to_string(),
        },
        moderation: ModerationConfig::default(),
        logging: LoggingConfig {
            level: "info".to_string(),
            format: "json".to_string(),
            console: true,
        },
    }
}

/// App state over a recording store seeded with one group (g1, two members)
/// and two users (u9 active, u7 banned), with both initial snapshots in.
pub async fn create_test_state() -> (Arc<RecordingStore>, Arc<AppState>) {
    let store = Arc::new(RecordingStore::new());
    store.inner().insert(
        "groups",
        "g1",
        object(json!({ "name": "Anatomy", "creatorId": "u1", "members": ["u1", "u2"], "password": "s3cret" })),
    );
    store.inner().insert(
        "users",
        "u9",
        object(json!({ "displayName": "Ana", "medCourse": "Medicina", "semester": "4", "isBanned": false })),
    );
    store.inner().insert("users", "u7", object(json!({ "displayName": "Bia", "isBanned": true })));

    let config = create_test_config();
    let metrics = Arc::new(Metrics::new());
    let controller = ModerationController::open(store.clone(), config.controller_settings(), Arc::clone(&metrics))
        .await
        .unwrap();

    wait_for_generation(controller.group_sync(), 1).await;
    wait_for_generation(controller.user_sync(), 1).await;

    (store, Arc::new(AppState::new(config, controller, metrics)))
}

pub fn object(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

pub async fn read_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    use http_body_util::BodyExt;

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
