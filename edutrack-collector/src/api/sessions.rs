//! Session lifecycle, navigation, entity views and consent

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{lookup_session, parse_body, ApiError};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct SessionCreated {
    pub session_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct NavigateRequest {
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct EntityRequest {
    pub entity_type: String,
    pub entity_id: String,
    pub entity_name: String,
}

#[derive(Debug, Deserialize)]
pub struct ConsentRequest {
    pub granted: bool,
}

/// Whether a debounced trigger was accepted or was a no-op
#[derive(Debug, Serialize)]
pub struct TriggerResponse {
    pub scheduled: bool,
}

#[derive(Debug, Serialize)]
pub struct ConsentResponse {
    pub granted: bool,
}

/// POST /api/sessions
pub async fn create_session(State(state): State<AppState>) -> (StatusCode, Json<SessionCreated>) {
    let session = state.sessions.create().await;
    (
        StatusCode::CREATED,
        Json(SessionCreated {
            session_id: session.id,
        }),
    )
}

/// DELETE /api/sessions/:id
///
/// Cancels pending settle timers; nothing fires after this returns.
pub async fn end_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let session = lookup_session(&state, &id).await?;
    if state.sessions.remove(session.id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::SessionNotFound(id))
    }
}

/// POST /api/sessions/:id/navigate
pub async fn navigate(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<TriggerResponse>, ApiError> {
    let session = lookup_session(&state, &id).await?;
    let request: NavigateRequest = parse_body(&body)?;
    Ok(Json(TriggerResponse {
        scheduled: session.navigate(&request.path),
    }))
}

/// PUT /api/sessions/:id/entity
pub async fn show_entity(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<TriggerResponse>, ApiError> {
    let session = lookup_session(&state, &id).await?;
    let request: EntityRequest = parse_body(&body)?;
    if request.entity_type.trim().is_empty() {
        return Err(ApiError::InvalidBody("entity_type must not be empty".to_string()));
    }
    let scheduled =
        session.show_entity(&request.entity_type, &request.entity_id, &request.entity_name);
    Ok(Json(TriggerResponse { scheduled }))
}

/// DELETE /api/sessions/:id/entity
pub async fn hide_entity(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let session = lookup_session(&state, &id).await?;
    session.hide_entity();
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/sessions/:id/consent
pub async fn set_consent(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<ConsentResponse>, ApiError> {
    let session = lookup_session(&state, &id).await?;
    let request: ConsentRequest = parse_body(&body)?;
    session.set_consent(request.granted);
    Ok(Json(ConsentResponse {
        granted: session.consent_granted(),
    }))
}
