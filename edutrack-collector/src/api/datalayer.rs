//! Data layer readout for server-side relays
//!
//! A relay either polls the snapshot or holds the SSE stream open and
//! receives every record appended after it connected.

use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use edutrack_tracker::DataLayerRecord;
use futures::stream::{Stream, StreamExt};
use serde::Serialize;
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{lookup_session, ApiError};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct SnapshotResponse {
    pub session_id: Uuid,
    pub records: Vec<DataLayerRecord>,
}

/// GET /api/sessions/:id/datalayer
pub async fn data_layer_snapshot(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SnapshotResponse>, ApiError> {
    let session = lookup_session(&state, &id).await?;
    Ok(Json(SnapshotResponse {
        session_id: session.id,
        records: session.data_layer.snapshot(),
    }))
}

/// GET /api/sessions/:id/datalayer/stream
pub async fn data_layer_stream(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let session = lookup_session(&state, &id).await?;
    debug!("Data layer relay connected to session {}", session.id);

    let stream = BroadcastStream::new(session.data_layer.subscribe()).filter_map(|result| async move {
        match result {
            Ok(record) => match serde_json::to_string(&record) {
                Ok(json) => Some(Ok(Event::default()
                    .event(sse_event_name(&record.event_name))
                    .data(json))),
                Err(e) => {
                    warn!("Failed to serialize data layer record: {}", e);
                    None
                }
            },
            Err(e) => {
                // Lagged relay; records it missed remain in the snapshot
                warn!("Data layer stream error: {:?}", e);
                None
            }
        }
    });

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    ))
}

/// SSE `event:` field for a record; the field cannot carry line breaks
///
/// The record JSON keeps the exact name.
fn sse_event_name(event_name: &str) -> String {
    event_name.replace(['\r', '\n'], " ")
}
