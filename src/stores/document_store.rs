use crate::core::error::StoreError;
use crate::models::record::RawRecord;
use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Stream of full collection snapshots. The first item is the state at the
/// time of subscribing; each further item follows a backend change.
pub type SnapshotStream = BoxStream<'static, Result<Vec<RawRecord>, StoreError>>;

/// Condition a field update is applied under
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Precondition {
    pub field: String,
    pub equals: Value,
}

impl Precondition {
    pub fn field_equals(field: impl Into<String>, equals: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            equals: equals.into(),
        }
    }
}

/// Primitives consumed from the remote document store
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Open a push subscription on a named collection
    async fn subscribe(&self, collection: &str) -> Result<SnapshotStream, StoreError>;

    /// Delete one record. Deleting an id that is already gone succeeds.
    async fn delete_record(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    /// Merge `fields` into an existing record, optionally guarded by a
    /// precondition on its current state.
    async fn update_fields(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
        precondition: Option<Precondition>,
    ) -> Result<(), StoreError>;
}
