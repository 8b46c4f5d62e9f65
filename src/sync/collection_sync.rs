// Live synchronization of one remote collection into a local snapshot

use crate::core::error::StoreError;
use crate::metrics::collector::Metrics;
use crate::models::record::{Document, RawRecord};
use crate::stores::document_store::DocumentStore;
use crate::stores::snapshot_cache::SnapshotCache;
use futures::StreamExt;
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Handle to an active subscription.
///
/// `unsubscribe` is idempotent. Dropping the handle unsubscribes too.
pub struct Subscription {
    collection: String,
    /// `true` while deliveries are allowed. The listener only runs with this
    /// lock held, so once `unsubscribe` returns no delivery can start.
    active: Arc<Mutex<bool>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Subscription {
    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn is_active(&self) -> bool {
        *self.active.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn unsubscribe(&self) {
        let was_active = {
            let mut active = self.active.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            std::mem::replace(&mut *active, false)
        };

        let task = self
            .task
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(task) = task {
            task.abort();
        }

        if was_active {
            info!(collection = %self.collection, "Subscription closed");
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

/// Subscribe to `collection`, decoding each record with `decode` and calling
/// `listener` with every full snapshot.
///
/// `decode` receives the backend id separately from the stored fields.
/// Records that fail to decode are left out of the snapshot and logged.
pub async fn subscribe<T, D, L>(
    store: &dyn DocumentStore,
    collection: &str,
    decode: D,
    listener: L,
) -> Result<Subscription, StoreError>
where
    T: Send + 'static,
    D: Fn(&str, Map<String, Value>) -> Result<T, serde_json::Error> + Send + 'static,
    L: Fn(Vec<T>) + Send + 'static,
{
    let mut stream = store.subscribe(collection).await?;

    let active = Arc::new(Mutex::new(true));
    let gate = Arc::clone(&active);
    let name = collection.to_string();

    let task = tokio::spawn(async move {
        while let Some(item) = stream.next().await {
            let records = match item {
                Ok(records) => records,
                Err(e) => {
                    warn!(collection = %name, error = %e, "Subscription interrupted, no further updates");
                    return;
                }
            };

            let snapshot = decode_snapshot(&name, records, &decode);

            if !deliver(&gate, &name, snapshot, &listener) {
                return;
            }
        }

        warn!(collection = %name, "Subscription stream ended, no further updates");
    });

    info!(collection = %collection, "Subscription opened");

    Ok(Subscription {
        collection: collection.to_string(),
        active,
        task: Mutex::new(Some(task)),
    })
}

/// Run the listener unless the subscription was closed. Returns whether it ran.
fn deliver<T, L>(gate: &Mutex<bool>, collection: &str, snapshot: Vec<T>, listener: &L) -> bool
where
    L: Fn(Vec<T>),
{
    let active = gate.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if !*active {
        return false;
    }

    debug!(collection = %collection, entries = snapshot.len(), "Snapshot delivered");
    listener(snapshot);
    true
}

fn decode_snapshot<T, D>(collection: &str, records: Vec<RawRecord>, decode: &D) -> Vec<T>
where
    D: Fn(&str, Map<String, Value>) -> Result<T, serde_json::Error>,
{
    records
        .into_iter()
        .filter_map(|record| match decode(&record.id, record.fields) {
            Ok(entity) => Some(entity),
            Err(e) => {
                warn!(
                    collection = %collection,
                    id = %record.id,
                    error = %e,
                    "Failed to decode record, leaving it out of the snapshot"
                );
                None
            }
        })
        .collect()
}

/// A collection kept live in a local [`SnapshotCache`]
pub struct CollectionSync<T> {
    cache: Arc<SnapshotCache<T>>,
    subscription: Subscription,
}

impl<T> CollectionSync<T>
where
    T: Document + Send + Sync + 'static,
{
    pub async fn open(
        store: &dyn DocumentStore,
        collection: &str,
        metrics: Arc<Metrics>,
    ) -> Result<Self, StoreError> {
        let cache = Arc::new(SnapshotCache::new());
        let sink = Arc::clone(&cache);
        let name = collection.to_string();

        let subscription = subscribe(store, collection, T::decode, move |snapshot: Vec<T>| {
            metrics.record_snapshot(&name);
            sink.replace(snapshot);
        })
        .await?;

        Ok(Self {
            cache,
            subscription,
        })
    }

    pub fn snapshot(&self) -> Arc<Vec<T>> {
        self.cache.entries()
    }

    pub fn cache(&self) -> &SnapshotCache<T> {
        &self.cache
    }

    pub fn collection(&self) -> &str {
        self.subscription.collection()
    }

    pub fn is_active(&self) -> bool {
        self.subscription.is_active()
    }

    pub fn unsubscribe(&self) {
        self.subscription.unsubscribe();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::group::Group;
    use crate::stores::memory_store::MemoryStore;
    use serde_json::json;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn fields(value: serde_json::Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn group_fields(name: &str) -> Map<String, Value> {
        fields(json!({ "name": name, "creatorId": "u1", "members": ["u1"] }))
    }

    async fn recv(rx: &mut mpsc::UnboundedReceiver<Vec<Group>>) -> Vec<Group> {
        tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("timed out waiting for delivery")
            .expect("listener dropped")
    }

    async fn listen(
        store: &MemoryStore,
    ) -> (Subscription, mpsc::UnboundedReceiver<Vec<Group>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let subscription = subscribe(store, "groups", Group::decode, move |snapshot| {
            let _ = tx.send(snapshot);
        })
        .await
        .unwrap();
        (subscription, rx)
    }

    fn ids(groups: &[Group]) -> Vec<&str> {
        groups.iter().map(|g| g.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_each_delivery_is_exactly_the_backend_snapshot() {
        let store = MemoryStore::new();
        store.insert("groups", "g1", group_fields("Anatomy"));
        let (_subscription, mut rx) = listen(&store).await;

        assert_eq!(ids(&recv(&mut rx).await), vec!["g1"]);

        store.insert("groups", "g2", group_fields("Physiology"));
        assert_eq!(ids(&recv(&mut rx).await), vec!["g1", "g2"]);

        store.delete_record("groups", "g1").await.unwrap();
        assert_eq!(ids(&recv(&mut rx).await), vec!["g2"]);

        store.delete_record("groups", "g2").await.unwrap();
        assert!(recv(&mut rx).await.is_empty());
    }

    #[tokio::test]
    async fn test_backend_id_is_merged_before_decode() {
        let store = MemoryStore::new();
        store.insert("groups", "g7", group_fields("Histology"));
        let (_subscription, mut rx) = listen(&store).await;

        let snapshot = recv(&mut rx).await;
        assert_eq!(snapshot[0].id, "g7");
        assert_eq!(snapshot[0].name, "Histology");
    }

    #[tokio::test]
    async fn test_undecodable_records_are_left_out() {
        #[derive(Debug, serde::Deserialize)]
        struct Strict {
            id: String,
            #[allow(dead_code)]
            rank: u32,
        }

        let store = MemoryStore::new();
        store.insert("ranks", "good", fields(json!({ "rank": 1 })));
        store.insert("ranks", "bad", fields(json!({ "rank": "first" })));

        let (tx, mut rx) = mpsc::unbounded_channel();
        let _subscription = subscribe(
            &store,
            "ranks",
            |id: &str, fields| crate::models::record::decode_with_id::<Strict>("id", id, fields),
            move |snapshot| {
                let _ = tx.send(snapshot);
            },
        )
        .await
        .unwrap();

        let snapshot = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        let ids: Vec<&str> = snapshot.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["good"]);
    }

    #[tokio::test]
    async fn test_group_without_creator_is_delivered() {
        let store = MemoryStore::new();
        store.insert("groups", "g1", fields(json!({ "name": "Anatomy", "members": ["u1", "u2"] })));
        let (_subscription, mut rx) = listen(&store).await;

        let snapshot = recv(&mut rx).await;
        assert_eq!(ids(&snapshot), vec!["g1"]);
        assert_eq!(snapshot[0].member_count(), 2);
    }

    #[tokio::test]
    async fn test_no_delivery_after_unsubscribe() {
        let store = MemoryStore::new();
        let (subscription, mut rx) = listen(&store).await;
        recv(&mut rx).await;

        subscription.unsubscribe();
        store.insert("groups", "g1", group_fields("Late"));

        let late = tokio::time::timeout(Duration::from_millis(100), rx.recv()).await;
        assert!(!matches!(late, Ok(Some(_))));
        assert!(!subscription.is_active());
    }

    #[tokio::test]
    async fn test_unsubscribe_is_idempotent() {
        let store = MemoryStore::new();
        let (subscription, _rx) = listen(&store).await;

        subscription.unsubscribe();
        subscription.unsubscribe();

        assert!(!subscription.is_active());
    }

    #[tokio::test]
    async fn test_drop_unsubscribes() {
        let store = MemoryStore::new();
        let (subscription, mut rx) = listen(&store).await;
        recv(&mut rx).await;

        drop(subscription);
        store.insert("groups", "g1", group_fields("Late"));

        let late = tokio::time::timeout(Duration::from_millis(100), rx.recv()).await;
        assert!(!matches!(late, Ok(Some(_))));
    }

    #[tokio::test]
    async fn test_interruption_stops_deliveries() {
        let store = MemoryStore::new();
        let (subscription, mut rx) = listen(&store).await;
        recv(&mut rx).await;

        store.close_subscriptions("groups");
        store.insert("groups", "g1", group_fields("Unseen"));

        // The task ends and drops the listener, closing the channel
        let after = tokio::time::timeout(Duration::from_secs(1), rx.recv()).await.unwrap();
        assert!(after.is_none());
        assert!(subscription.is_active());
    }

    #[tokio::test]
    async fn test_collection_sync_tracks_latest_snapshot() {
        let store = MemoryStore::new();
        store.insert("groups", "g1", group_fields("Anatomy"));
        let metrics = Arc::new(Metrics::new());

        let sync = CollectionSync::<Group>::open(&store, "groups", Arc::clone(&metrics))
            .await
            .unwrap();
        let mut rx = sync.cache().watch();

        rx.wait_for(|s| s.generation >= 1).await.unwrap();
        assert_eq!(ids(&sync.snapshot()), vec!["g1"]);

        store.delete_record("groups", "g1").await.unwrap();
        rx.wait_for(|s| s.generation >= 2).await.unwrap();
        assert!(sync.snapshot().is_empty());

        assert_eq!(metrics.snapshots_for("groups"), 2);
        assert_eq!(sync.collection(), "groups");

        sync.unsubscribe();
        assert!(!sync.is_active());
    }
}
