// HTTP routes configuration

use crate::core::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Public endpoints
        .route("/health", get(crate::handlers::health::health_handler))

        // Operator endpoints (require API key)
        .route("/view", get(crate::handlers::view::view_handler))
        .route("/view/select", post(crate::handlers::view::select_view_handler))
        .route("/groups", get(crate::handlers::groups::group_list_handler))
        .route("/group/remove", post(crate::handlers::groups::group_remove_handler))
        .route("/users", get(crate::handlers::users::user_list_handler))
        .route("/user/ban", post(crate::handlers::users::user_ban_handler))
        .route("/metrics", get(crate::handlers::metrics::metrics_handler))

        // 404 fallback for all unmatched routes
        .fallback(crate::handlers::fallback::fallback_handler)

        .with_state(state)
}
