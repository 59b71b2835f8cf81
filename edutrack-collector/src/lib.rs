//! edutrack-collector library - HTTP collector for browser tracking sessions
//!
//! Hosts one tracking session per browser tab. Pages report navigation,
//! entity views and explicit tracking calls; the server-side relay reads
//! each session's data layer as a snapshot or a live SSE stream.

use axum::Router;
use chrono::{DateTime, Utc};
use edutrack_common::config::TomlConfig;
use edutrack_tracker::{PixelSdk, RouteTable};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub mod api;
pub mod session;

use session::SessionRegistry;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionRegistry>,
    pub config: Arc<TomlConfig>,
    /// Service startup timestamp for uptime reporting
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Create state; starts the idle-session sweep when a runtime is running
    pub fn new(config: TomlConfig, routes: RouteTable, pixel: Arc<dyn PixelSdk>) -> Self {
        let config = Arc::new(config);
        let sessions = Arc::new(SessionRegistry::new(
            Arc::clone(&config),
            Arc::new(routes),
            pixel,
        ));

        match config.tracking.session_ttl() {
            Some(ttl) if tokio::runtime::Handle::try_current().is_ok() => {
                sessions.spawn_idle_sweep(ttl);
                info!("Idle sessions expire after {}s", ttl.as_secs());
            }
            Some(_) => warn!("No async runtime, idle sessions will not expire"),
            None => info!("Session expiry disabled"),
        }

        Self {
            sessions,
            config,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{delete, get, post, put};

    let api = Router::new()
        .route("/api/sessions", post(api::create_session))
        .route("/api/sessions/:id", delete(api::end_session))
        .route("/api/sessions/:id/navigate", post(api::navigate))
        .route(
            "/api/sessions/:id/entity",
            put(api::show_entity).delete(api::hide_entity),
        )
        .route("/api/sessions/:id/consent", post(api::set_consent))
        .route("/api/sessions/:id/track/:kind", post(api::track_event))
        .route("/api/sessions/:id/datalayer", get(api::data_layer_snapshot))
        .route("/api/sessions/:id/datalayer/stream", get(api::data_layer_stream));

    Router::new()
        .merge(api)
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
