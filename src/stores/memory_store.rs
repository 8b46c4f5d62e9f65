use crate::core::error::StoreError;
use crate::models::record::RawRecord;
use crate::stores::document_store::{DocumentStore, Precondition, SnapshotStream};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use futures::StreamExt;
use serde_json::{Map, Value};
use std::path::Path;
use tokio::sync::mpsc;

#[derive(Default)]
struct CollectionState {
    /// Records in insertion order
    records: Vec<RawRecord>,
    subscribers: Vec<mpsc::UnboundedSender<Vec<RawRecord>>>,
    writes_denied: bool,
}

impl CollectionState {
    /// Push the full current snapshot to every live subscriber, dropping
    /// subscribers whose stream has gone away.
    fn publish(&mut self) {
        let snapshot = self.records.clone();
        self.subscribers
            .retain(|tx| tx.send(snapshot.clone()).is_ok());
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|record| record.id == id)
    }
}

/// In-process document store with push subscriptions.
///
/// Every mutation is published as a full snapshot to all subscribers of the
/// collection while the collection's shard lock is held, so subscribers see
/// snapshots in mutation order.
#[derive(Default)]
pub struct MemoryStore {
    collections: DashMap<String, CollectionState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            collections: DashMap::new(),
        }
    }

    /// Load a seed file of the form `{ "<collection>": [ { "id": "..", ...fields } ] }`
    pub fn from_seed_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read seed file: {}", path.display()))?;

        Self::from_seed_json(&content)
            .context(format!("Failed to load seed file: {}", path.display()))
    }

    pub fn from_seed_json(content: &str) -> Result<Self> {
        let seed: Map<String, Value> =
            serde_json::from_str(content).context("Seed must be a JSON object of collections")?;

        let store = Self::new();

        for (collection, documents) in seed {
            let Value::Array(documents) = documents else {
                bail!("Seed collection '{}' must be an array", collection);
            };

            for (index, document) in documents.into_iter().enumerate() {
                let Value::Object(mut fields) = document else {
                    bail!("Seed document {} in '{}' must be an object", index, collection);
                };

                let id = match fields.remove("id") {
                    Some(Value::String(id)) if !id.is_empty() => id,
                    _ => bail!("Seed document {} in '{}' needs a string id", index, collection),
                };

                store.insert(&collection, &id, fields);
            }
        }

        Ok(store)
    }

    /// Create or replace a record and publish the new snapshot
    pub fn insert(&self, collection: &str, id: &str, fields: Map<String, Value>) {
        let mut state = self.collections.entry(collection.to_string()).or_default();

        match state.position(id) {
            Some(index) => state.records[index].fields = fields,
            None => state.records.push(RawRecord::new(id, fields)),
        }

        state.publish();
    }

    /// Current records of a collection, in backend order
    pub fn records(&self, collection: &str) -> Vec<RawRecord> {
        self.collections
            .get(collection)
            .map(|state| state.records.clone())
            .unwrap_or_default()
    }

    /// Reject every write to `collection` with `PermissionDenied` while set
    pub fn deny_writes(&self, collection: &str, denied: bool) {
        self.collections
            .entry(collection.to_string())
            .or_default()
            .writes_denied = denied;
    }

    /// End every open subscription on `collection`, as a dropped backend
    /// connection would.
    pub fn close_subscriptions(&self, collection: &str) {
        if let Some(mut state) = self.collections.get_mut(collection) {
            state.subscribers.clear();
        }
    }

    pub fn subscriber_count(&self, collection: &str) -> usize {
        self.collections
            .get_mut(collection)
            .map(|mut state| {
                state.subscribers.retain(|tx| !tx.is_closed());
                state.subscribers.len()
            })
            .unwrap_or(0)
    }

    fn check_writable(state: &CollectionState, collection: &str) -> Result<(), StoreError> {
        if state.writes_denied {
            return Err(StoreError::PermissionDenied(format!(
                "writes to '{}' are not allowed",
                collection
            )));
        }
        Ok(())
    }
}

/// A missing or null field satisfies an `equals: false` precondition, the
/// way an account without a ban flag is not banned.
fn precondition_holds(fields: &Map<String, Value>, precondition: &Precondition) -> bool {
    let current = fields.get(&precondition.field).unwrap_or(&Value::Null);

    current == &precondition.equals
        || (current.is_null() && precondition.equals == Value::Bool(false))
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn subscribe(&self, collection: &str) -> Result<SnapshotStream, StoreError> {
        let (tx, rx) = mpsc::unbounded_channel();

        {
            let mut state = self.collections.entry(collection.to_string()).or_default();
            // Initial snapshot goes out before any later mutation can publish
            let _ = tx.send(state.records.clone());
            state.subscribers.push(tx);
        }

        let stream = futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|snapshot| (Ok(snapshot), rx))
        });

        Ok(stream.boxed())
    }

    async fn delete_record(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut state = self.collections.entry(collection.to_string()).or_default();
        Self::check_writable(&state, collection)?;

        if let Some(index) = state.position(id) {
            state.records.remove(index);
            state.publish();
        }

        Ok(())
    }

    async fn update_fields(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
        precondition: Option<Precondition>,
    ) -> Result<(), StoreError> {
        let mut state = self.collections.entry(collection.to_string()).or_default();
        Self::check_writable(&state, collection)?;

        let index = state.position(id).ok_or_else(|| StoreError::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        })?;

        if let Some(precondition) = &precondition {
            if !precondition_holds(&state.records[index].fields, precondition) {
                return Err(StoreError::PreconditionFailed {
                    collection: collection.to_string(),
                    id: id.to_string(),
                    reason: format!("{} no longer equals {}", precondition.field, precondition.equals),
                });
            }
        }

        state.records[index].fields.extend(fields);
        state.publish();

        Ok(())
    }
}
