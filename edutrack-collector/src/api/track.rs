//! Explicit tracking calls
//!
//! Tracking never fails the caller: once the session and body check out the
//! response is always `202 Accepted`, with the dispatch outcome attached for
//! diagnostics.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use edutrack_common::events::Extensions;
use edutrack_tracker::{DispatchOutcome, PixelOutcome};
use serde::{Deserialize, Serialize};

use super::{lookup_session, parse_body, ApiError};
use crate::AppState;

/// Body of `track/custom`
#[derive(Debug, Deserialize)]
pub struct CustomEventRequest {
    pub name: String,
    #[serde(default)]
    pub params: Extensions,
}

#[derive(Debug, Serialize)]
pub struct TrackResponse {
    pub pixel: &'static str,
    pub appended: bool,
}

impl From<DispatchOutcome> for TrackResponse {
    fn from(outcome: DispatchOutcome) -> Self {
        let pixel = match outcome.pixel {
            PixelOutcome::Delivered => "delivered",
            PixelOutcome::Skipped => "skipped",
            PixelOutcome::Failed => "failed",
        };
        Self {
            pixel,
            appended: outcome.appended,
        }
    }
}

/// POST /api/sessions/:id/track/:kind
pub async fn track_event(
    State(state): State<AppState>,
    Path((id, kind)): Path<(String, String)>,
    body: Bytes,
) -> Result<(StatusCode, Json<TrackResponse>), ApiError> {
    let session = lookup_session(&state, &id).await?;
    let tracker = &session.tracker;

    let outcome = match kind.as_str() {
        "lead" => tracker.track_lead(parse_body(&body)?),
        "form" => tracker.track_form_submission(parse_body(&body)?),
        "search" => tracker.track_search(parse_body(&body)?),
        "add-to-cart" => tracker.track_add_to_cart(parse_body(&body)?),
        "conversion" => tracker.track_conversion(parse_body(&body)?),
        "view-content" => tracker.track_view_content(parse_body(&body)?),
        "custom" => {
            let request: CustomEventRequest = parse_body(&body)?;
            if request.name.trim().is_empty() {
                return Err(ApiError::InvalidBody("name must not be empty".to_string()));
            }
            tracker.track_custom_event(&request.name, request.params)
        }
        _ => return Err(ApiError::UnknownEventKind(kind)),
    };

    Ok((StatusCode::ACCEPTED, Json(outcome.into())))
}
