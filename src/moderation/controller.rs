// Operator moderation state and actions

use crate::core::error::{ModerationError, StoreError};
use crate::metrics::collector::{Metrics, MetricsSnapshot};
use crate::models::group::Group;
use crate::models::user::UserAccount;
use crate::moderation::confirm::{ConfirmationPrompt, Confirmer};
use crate::moderation::view::{SelectedView, ViewState};
use crate::stores::document_store::{DocumentStore, Precondition};
use crate::sync::collection_sync::CollectionSync;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{error, info};

/// Field flipped by the ban toggle
pub const BAN_FIELD: &str = "isBanned";

#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub groups_collection: String,
    pub users_collection: String,
    /// Guard ban toggles with `isBanned == currently_banned` instead of
    /// writing the negation unconditionally
    pub conditional_ban_writes: bool,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            groups_collection: "groups".to_string(),
            users_collection: "users".to_string(),
            conditional_ban_writes: false,
        }
    }
}

/// How a moderation action settled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Operator declined; nothing was written
    Declined,
    /// Store accepted the write
    Applied,
}

impl ActionOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionOutcome::Declined => "declined",
            ActionOutcome::Applied => "applied",
        }
    }
}

/// Holds one live subscription per collection. Local snapshots are never
/// edited: a confirmed write shows up only with the next pushed snapshot.
pub struct ModerationController {
    store: Arc<dyn DocumentStore>,
    settings: ControllerSettings,
    groups: CollectionSync<Group>,
    users: CollectionSync<UserAccount>,
    view: ViewState,
    metrics: Arc<Metrics>,
}

impl ModerationController {
    /// Open both subscriptions. The selected view starts on Groups.
    pub async fn open(
        store: Arc<dyn DocumentStore>,
        settings: ControllerSettings,
        metrics: Arc<Metrics>,
    ) -> Result<Self, StoreError> {
        let groups =
            CollectionSync::open(store.as_ref(), &settings.groups_collection, Arc::clone(&metrics))
                .await?;
        let users =
            CollectionSync::open(store.as_ref(), &settings.users_collection, Arc::clone(&metrics))
                .await?;

        Ok(Self {
            store,
            settings,
            groups,
            users,
            view: ViewState::new(),
            metrics,
        })
    }

    pub fn selected_view(&self) -> SelectedView {
        self.view.selected()
    }

    /// Switch tabs. Both subscriptions keep running either way.
    pub fn select_view(&self, view: SelectedView) {
        self.view.select(view);
    }

    pub fn groups(&self) -> Arc<Vec<Group>> {
        self.groups.snapshot()
    }

    pub fn users(&self) -> Arc<Vec<UserAccount>> {
        self.users.snapshot()
    }

    pub fn group_sync(&self) -> &CollectionSync<Group> {
        &self.groups
    }

    pub fn user_sync(&self) -> &CollectionSync<UserAccount> {
        &self.users
    }

    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.get_snapshot(
            &self.settings.groups_collection,
            &self.settings.users_collection,
            &self.groups(),
            &self.users(),
        )
    }

    /// Delete a group after confirmation.
    ///
    /// The id is not checked against the local snapshot; deleting a group
    /// someone else already removed settles as applied.
    pub async fn remove_group(
        &self,
        group_id: &str,
        confirmer: &dyn Confirmer,
    ) -> Result<ActionOutcome, ModerationError> {
        if group_id.trim().is_empty() {
            return Err(ModerationError::InvalidParameter("group id must not be empty".to_string()));
        }

        let prompt = ConfirmationPrompt::DeleteGroup;
        if !confirmer.confirm(prompt).await {
            self.metrics.increment_declined();
            info!(group_id = %group_id, "Group deletion declined");
            return Ok(ActionOutcome::Declined);
        }

        let collection = &self.settings.groups_collection;
        match self.store.delete_record(collection, group_id).await {
            Ok(()) => {
                self.metrics.increment_applied();
                info!(collection = %collection, group_id = %group_id, "Group deleted");
                Ok(ActionOutcome::Applied)
            }
            Err(e) => {
                self.metrics.increment_failed();
                error!(
                    collection = %collection,
                    group_id = %group_id,
                    error = %e,
                    "Group deletion failed"
                );
                Err(e.into())
            }
        }
    }

    /// Flip a user's ban flag after confirmation.
    ///
    /// `currently_banned` is the caller's last-seen value; the write sets
    /// its negation. With `conditional_ban_writes` the store rejects the
    /// write if the flag changed in the meantime.
    pub async fn toggle_user_ban(
        &self,
        uid: &str,
        currently_banned: bool,
        confirmer: &dyn Confirmer,
    ) -> Result<ActionOutcome, ModerationError> {
        if uid.trim().is_empty() {
            return Err(ModerationError::InvalidParameter("uid must not be empty".to_string()));
        }

        let prompt = ConfirmationPrompt::for_ban_toggle(currently_banned);
        if !confirmer.confirm(prompt).await {
            self.metrics.increment_declined();
            info!(uid = %uid, currently_banned, "Ban toggle declined");
            return Ok(ActionOutcome::Declined);
        }

        let banned = !currently_banned;
        let mut fields = Map::new();
        fields.insert(BAN_FIELD.to_string(), Value::Bool(banned));

        let precondition = self
            .settings
            .conditional_ban_writes
            .then(|| Precondition::field_equals(BAN_FIELD, currently_banned));

        let collection = &self.settings.users_collection;
        match self.store.update_fields(collection, uid, fields, precondition).await {
            Ok(()) => {
                self.metrics.increment_applied();
                info!(collection = %collection, uid = %uid, banned, "User ban flag updated");
                Ok(ActionOutcome::Applied)
            }
            Err(e) => {
                self.metrics.increment_failed();
                error!(
                    collection = %collection,
                    uid = %uid,
                    banned,
                    error = %e,
                    "User ban update failed"
                );
                Err(e.into())
            }
        }
    }

    /// Stop both subscriptions
    pub fn shutdown(&self) {
        self.groups.unsubscribe();
        self.users.unsubscribe();
    }
}
