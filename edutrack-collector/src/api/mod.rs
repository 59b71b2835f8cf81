//! HTTP API handlers for edutrack-collector

pub mod datalayer;
pub mod error;
pub mod health;
pub mod sessions;
pub mod track;

pub use datalayer::{data_layer_snapshot, data_layer_stream};
pub use error::ApiError;
pub use health::health_routes;
pub use sessions::{create_session, end_session, hide_entity, navigate, set_consent, show_entity};
pub use track::track_event;

use std::sync::Arc;
use uuid::Uuid;

use crate::session::Session;
use crate::AppState;

/// Resolve a session id from the URL path and mark it active
pub(crate) async fn lookup_session(state: &AppState, id: &str) -> Result<Arc<Session>, ApiError> {
    let uuid = Uuid::parse_str(id).map_err(|_| ApiError::SessionNotFound(id.to_string()))?;
    let session = state
        .sessions
        .get(uuid)
        .await
        .ok_or_else(|| ApiError::SessionNotFound(id.to_string()))?;
    session.touch();
    Ok(session)
}

/// Parse a JSON request body; an empty body reads as `{}`
pub(crate) fn parse_body<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    let body = if body.iter().all(u8::is_ascii_whitespace) {
        b"{}".as_slice()
    } else {
        body
    };
    serde_json::from_slice(body).map_err(|e| ApiError::InvalidBody(e.to_string()))
}
