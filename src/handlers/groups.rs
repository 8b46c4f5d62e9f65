use crate::core::error::AdminError;
use crate::core::state::AppState;
use crate::models::admin::{ActionResponse, ApiKeyQuery, GroupListResponse, GroupRemoveQuery, GroupRow};
use crate::moderation::confirm::{Acknowledgement, ConfirmationPrompt};
use crate::moderation::controller::ActionOutcome;
use crate::utils::auth::require_operator;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;

/// Rows of the Groups tab, in the order of the latest snapshot
///
/// GET /groups?api_key=<key>
pub async fn group_list_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ApiKeyQuery>,
) -> Result<Response, AdminError> {
    require_operator(&params.api_key, state.admin_key(), "group list")?;

    let groups = state.controller.groups();

    Ok((
        StatusCode::OK,
        Json(GroupListResponse {
            success: true,
            groups: groups.iter().map(GroupRow::from).collect(),
        }),
    )
        .into_response())
}

/// Delete a group. Without `confirm=true` nothing is written and the
/// confirmation prompt is returned.
///
/// POST /group/remove?api_key=<key>&id=<group id>&confirm=<true|false>
pub async fn group_remove_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GroupRemoveQuery>,
) -> Result<Response, AdminError> {
    require_operator(&params.api_key, state.admin_key(), "group remove")?;

    let confirmer = Acknowledgement::new(params.confirm);
    let outcome = state.controller.remove_group(&params.id, &confirmer).await?;

    let message = match outcome {
        ActionOutcome::Declined => ConfirmationPrompt::DeleteGroup.message().to_string(),
        ActionOutcome::Applied => format!("Group {} deleted", params.id),
    };

    Ok((
        StatusCode::OK,
        Json(ActionResponse {
            success: true,
            outcome: outcome.as_str().to_string(),
            message,
        }),
    )
        .into_response())
}
