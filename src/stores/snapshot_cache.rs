use std::sync::Arc;
use tokio::sync::watch;

/// The latest snapshot of one collection
#[derive(Debug)]
pub struct Snapshot<T> {
    /// Number of deliveries so far; 0 until the first one arrives
    pub generation: u64,
    pub entries: Arc<Vec<T>>,
}

impl<T> Clone for Snapshot<T> {
    fn clone(&self) -> Self {
        Self {
            generation: self.generation,
            entries: Arc::clone(&self.entries),
        }
    }
}

/// Holder of the most recent decoded snapshot of a collection.
///
/// Written only by the subscription's delivery callback; readers get a cheap
/// `Arc` of the whole list. Each delivery replaces the previous list outright.
pub struct SnapshotCache<T> {
    tx: watch::Sender<Snapshot<T>>,
}

impl<T> SnapshotCache<T> {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Snapshot {
            generation: 0,
            entries: Arc::new(Vec::new()),
        });
        Self { tx }
    }

    /// Replace the held snapshot with `entries`
    pub fn replace(&self, entries: Vec<T>) {
        self.tx.send_modify(|snapshot| {
            snapshot.generation += 1;
            snapshot.entries = Arc::new(entries);
        });
    }

    pub fn entries(&self) -> Arc<Vec<T>> {
        Arc::clone(&self.tx.borrow().entries)
    }

    pub fn generation(&self) -> u64 {
        self.tx.borrow().generation
    }

    pub fn len(&self) -> usize {
        self.tx.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tx.borrow().entries.is_empty()
    }

    /// Receiver notified on every replacement
    pub fn watch(&self) -> watch::Receiver<Snapshot<T>> {
        self.tx.subscribe()
    }
}

impl<T> Default for SnapshotCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_empty() {
        let cache: SnapshotCache<u32> = SnapshotCache::new();
        assert!(cache.is_empty());
        assert_eq!(cache.generation(), 0);
    }

    #[test]
    fn test_replace_discards_previous_entries() {
        let cache = SnapshotCache::new();
        cache.replace(vec!["g1", "g2"]);
        cache.replace(vec!["g3"]);

        assert_eq!(*cache.entries(), vec!["g3"]);
        assert_eq!(cache.generation(), 2);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_readers_keep_their_snapshot() {
        let cache = SnapshotCache::new();
        cache.replace(vec![1, 2, 3]);
        let held = cache.entries();

        cache.replace(Vec::new());

        assert_eq!(held.len(), 3);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_watchers_are_notified() {
        let cache = SnapshotCache::new();
        let mut rx = cache.watch();

        cache.replace(vec!["u9"]);

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().generation, 1);
        assert_eq!(*rx.borrow().entries, vec!["u9"]);
    }
}
