use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Errors returned to API callers
#[derive(Debug)]
pub enum ApiError {
    SessionNotFound(String),
    UnknownEventKind(String),
    InvalidBody(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::SessionNotFound(id) => {
                (StatusCode::NOT_FOUND, format!("Session not found: {}", id))
            }
            ApiError::UnknownEventKind(kind) => {
                (StatusCode::NOT_FOUND, format!("Unknown event kind: {}", kind))
            }
            ApiError::InvalidBody(msg) => {
                (StatusCode::BAD_REQUEST, format!("Invalid request body: {}", msg))
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
