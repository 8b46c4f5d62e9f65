use crate::models::group::Group;
use crate::models::user::UserAccount;
use crate::utils::time::current_timestamp;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

pub struct Metrics {
    /// Deliveries received, keyed by collection name
    snapshots: DashMap<String, u64>,
    pub confirmations_declined: AtomicU64,
    pub writes_applied: AtomicU64,
    pub writes_failed: AtomicU64,
    pub start_time: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub group_snapshots: u64,
    pub user_snapshots: u64,
    pub confirmations_declined: u64,
    pub writes_applied: u64,
    pub writes_failed: u64,
    pub groups: usize,
    pub users: usize,
    pub banned_users: usize,
    pub uptime_seconds: i64,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            snapshots: DashMap::new(),
            confirmations_declined: AtomicU64::new(0),
            writes_applied: AtomicU64::new(0),
            writes_failed: AtomicU64::new(0),
            start_time: current_timestamp(),
        }
    }

    pub fn record_snapshot(&self, collection: &str) {
        *self.snapshots.entry(collection.to_string()).or_insert(0) += 1;
    }

    pub fn snapshots_for(&self, collection: &str) -> u64 {
        self.snapshots.get(collection).map(|count| *count).unwrap_or(0)
    }

    pub fn increment_declined(&self) {
        self.confirmations_declined.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_applied(&self) {
        self.writes_applied.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_failed(&self) {
        self.writes_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Combine the counters with gauges derived from the current snapshots
    pub fn get_snapshot(
        &self,
        groups_collection: &str,
        users_collection: &str,
        groups: &[Group],
        users: &[UserAccount],
    ) -> MetricsSnapshot {
        MetricsSnapshot {
            group_snapshots: self.snapshots_for(groups_collection),
            user_snapshots: self.snapshots_for(users_collection),
            confirmations_declined: self.confirmations_declined.load(Ordering::Relaxed),
            writes_applied: self.writes_applied.load(Ordering::Relaxed),
            writes_failed: self.writes_failed.load(Ordering::Relaxed),
            groups: groups.len(),
            users: users.len(),
            banned_users: users.iter().filter(|user| user.is_banned).count(),
            uptime_seconds: current_timestamp() - self.start_time,
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
