//! Unified error handling for the server.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Engine(#[from] marksync_engine::Error),

    #[error("{0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body.
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl AppError {
    /// Status code and client-facing message.
    fn status_and_message(&self) -> (StatusCode, String) {
        use marksync_engine::Error as Engine;

        match self {
            AppError::Engine(Engine::Validation(msg)) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Engine(Engine::NotFound(msg)) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Engine(e @ Engine::Collision { .. }) => {
                tracing::warn!("Token generation failed: {}", e);
                (
                    StatusCode::CONFLICT,
                    "Token collision, try again".to_string(),
                )
            }
            AppError::Engine(e @ Engine::Storage(_)) => {
                tracing::error!("Storage error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Storage error".to_string(),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        }
    }
}

impl AppError {
    /// Message safe to show a client over any transport.
    pub fn client_message(&self) -> String {
        self.status_and_message().1
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = self.status_and_message();
        (status, Json(ErrorResponse { error })).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// Result type alias for handlers.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use marksync_engine::Error as Engine;

    fn status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn status_mapping() {
        assert_eq!(
            status(Engine::Validation("url is required".into()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(Engine::NotFound("URL not found".into()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(Engine::Collision { attempts: 5 }.into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status(Engine::Storage("disk full".into()).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status(AppError::BadRequest("missing".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(AppError::Internal("join".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn storage_details_stay_server_side() {
        let err: AppError = Engine::Storage("/var/secret/path: denied".into()).into();
        let (_, message) = err.status_and_message();
        assert_eq!(message, "Storage error");
        assert_eq!(err.client_message(), "Storage error");
    }

    #[test]
    fn client_message_keeps_input_errors() {
        let err: AppError = Engine::Validation("url is required".into()).into();
        assert_eq!(err.client_message(), "url is required");

        let err: AppError = Engine::NotFound("URL not found".into()).into();
        assert_eq!(err.client_message(), "URL not found");
    }
}
