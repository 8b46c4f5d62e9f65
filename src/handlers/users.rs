use crate::core::error::AdminError;
use crate::core::state::AppState;
use crate::models::admin::{ActionResponse, ApiKeyQuery, UserBanQuery, UserListResponse, UserRow};
use crate::moderation::confirm::{Acknowledgement, ConfirmationPrompt};
use crate::moderation::controller::ActionOutcome;
use crate::utils::auth::require_operator;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;

/// Rows of the Users tab, each with its Ban/Unban action label
///
/// GET /users?api_key=<key>
pub async fn user_list_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ApiKeyQuery>,
) -> Result<Response, AdminError> {
    require_operator(&params.api_key, state.admin_key(), "user list")?;

    let users = state.controller.users();

    Ok((
        StatusCode::OK,
        Json(UserListResponse {
            success: true,
            users: users.iter().map(UserRow::from).collect(),
        }),
    )
        .into_response())
}

/// Toggle a user's ban flag from the caller's last-seen value.
///
/// POST /user/ban?api_key=<key>&uid=<uid>&currently_banned=<bool>&confirm=<bool>
pub async fn user_ban_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UserBanQuery>,
) -> Result<Response, AdminError> {
    require_operator(&params.api_key, state.admin_key(), "user ban toggle")?;

    let confirmer = Acknowledgement::new(params.confirm);
    let outcome = state
        .controller
        .toggle_user_ban(&params.uid, params.currently_banned, &confirmer)
        .await?;

    let message = match outcome {
        ActionOutcome::Declined => ConfirmationPrompt::for_ban_toggle(params.currently_banned)
            .message()
            .to_string(),
        ActionOutcome::Applied if params.currently_banned => format!("User {} unbanned", params.uid),
        ActionOutcome::Applied => format!("User {} banned", params.uid),
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
