// Centralized error handling for the moderation service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Outcomes of a document store request other than success
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Record not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    #[error("Precondition failed on {collection}/{id}: {reason}")]
    PreconditionFailed {
        collection: String,
        id: String,
        reason: String,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Document store returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed payload from document store: {0}")]
    Decode(String),
}

/// Errors surfaced by a moderation action
#[derive(Error, Debug)]
pub enum ModerationError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Write rejected: {0}")]
    WriteRejected(#[from] StoreError),
}

#[derive(Error, Debug)]
pub enum AdminError {
    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error(transparent)]
    Moderation(#[from] ModerationError),
}

impl AdminError {
    fn status(&self) -> StatusCode {
        match self {
            AdminError::InvalidApiKey => StatusCode::UNAUTHORIZED,
            AdminError::InvalidParameter(_) => StatusCode::BAD_REQUEST,
            AdminError::Moderation(ModerationError::InvalidParameter(_)) => StatusCode::BAD_REQUEST,
            AdminError::Moderation(ModerationError::WriteRejected(store)) => match store {
                StoreError::PermissionDenied(_) => StatusCode::FORBIDDEN,
                StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
                StoreError::PreconditionFailed { .. } => StatusCode::CONFLICT,
                _ => StatusCode::BAD_GATEWAY,
            },
        }
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        use crate::models::admin::ErrorResponse;
        use axum::response::Json;

        (
            self.status(),
            Json(ErrorResponse {
                success: false,
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[derive(Error, Debug)]
pub enum MonitoringError {
    #[error("Invalid API key")]
    InvalidApiKey,
}

impl IntoResponse for MonitoringError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            MonitoringError::InvalidApiKey => (StatusCode::UNAUTHORIZED, "Unauthorized"),
        };

        (status, message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AdminError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_admin_error_status_mapping() {
        assert_eq!(status_of(AdminError::InvalidApiKey), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_of(AdminError::InvalidParameter("view".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ModerationError::InvalidParameter("uid".into()).into()),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_write_rejection_status_mapping() {
        let denied = ModerationError::from(StoreError::PermissionDenied("rules".into()));
        assert_eq!(status_of(denied.into()), StatusCode::FORBIDDEN);

        let missing = ModerationError::from(StoreError::NotFound {
            collection: "users".into(),
            id: "u1".into(),
        });
        assert_eq!(status_of(missing.into()), StatusCode::NOT_FOUND);

        let raced = ModerationError::from(StoreError::PreconditionFailed {
            collection: "users".into(),
            id: "u1".into(),
            reason: "isBanned changed".into(),
        });
        assert_eq!(status_of(raced.into()), StatusCode::CONFLICT);

        let upstream = ModerationError::from(StoreError::Status {
            status: 500,
            body: "boom".into(),
        });
        assert_eq!(status_of(upstream.into()), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_error_messages() {
        let err = StoreError::NotFound {
            collection: "groups".into(),
            id: "g1".into(),
        };
        assert_eq!(err.to_string(), "Record not found: groups/g1");
        assert_eq!(MonitoringError::InvalidApiKey.to_string(), "Invalid API key");
    }
}
