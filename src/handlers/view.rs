use crate::core::error::AdminError;
use crate::core::state::AppState;
use crate::models::admin::{ApiKeyQuery, GroupRow, SelectViewQuery, UserRow, ViewResponse};
use crate::moderation::view::SelectedView;
use crate::utils::auth::require_operator;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;

fn render(state: &AppState) -> ViewResponse {
    let selected = state.controller.selected_view();

    let (groups, users) = match selected {
        SelectedView::Groups => (
            Some(state.controller.groups().iter().map(GroupRow::from).collect()),
            None,
        ),
        SelectedView::Users => (
            None,
            Some(state.controller.users().iter().map(UserRow::from).collect()),
        ),
    };

    ViewResponse {
        success: true,
        selected_view: selected.as_str().to_string(),
        view_label: selected.label().to_string(),
        groups,
        users,
    }
}

/// Active tab and its rows
///
/// GET /view?api_key=<key>
pub async fn view_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ApiKeyQuery>,
) -> Result<Response, AdminError> {
    require_operator(&params.api_key, state.admin_key(), "view")?;

    Ok((StatusCode::OK, Json(render(&state))).into_response())
}

/// Switch tabs. Local only, nothing is sent to the store.
///
/// POST /view/select?api_key=<key>&view=<groups|users>
pub async fn select_view_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SelectViewQuery>,
) -> Result<Response, AdminError> {
    require_operator(&params.api_key, state.admin_key(), "view select")?;

    let view: SelectedView = params.view.parse().map_err(AdminError::InvalidParameter)?;
    state.controller.select_view(view);

    Ok((StatusCode::OK, Json(render(&state))).into_response())
}
