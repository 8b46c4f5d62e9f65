use crate::models::admin::ErrorResponse;
use axum::{
    http::{StatusCode, Uri},
    response::{IntoResponse, Json, Response},
};

pub async fn fallback_handler(uri: Uri) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            success: false,
            error: format!("Unknown endpoint: {}", uri.path()),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fallback_is_not_found() {
        let response = fallback_handler(Uri::from_static("/announce")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
