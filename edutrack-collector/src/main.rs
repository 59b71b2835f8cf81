//! edutrack-collector - marketing event collector
//!
//! Hosts per-tab tracking sessions: debounced page views, entity views and
//! explicit conversion calls, each delivered to the ad pixel and appended
//! to the session's data layer.

use anyhow::{Context, Result};
use clap::Parser;
use edutrack_common::config::TomlConfig;
use edutrack_collector::{build_router, AppState};
use edutrack_tracker::{HttpPixel, NoopPixel, PixelSdk, RouteTable};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

/// Command-line arguments for edutrack-collector
#[derive(Parser, Debug)]
#[command(name = "edutrack-collector")]
#[command(about = "Marketing event collector for EduTrack sites")]
#[command(version)]
struct Args {
    /// Path to TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides config and EDUTRACK_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    bind: IpAddr,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = TomlConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    let level = config
        .logging
        .level
        .parse::<tracing::Level>()
        .unwrap_or(tracing::Level::INFO);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    // Build identification first, before anything else logs
    info!(
        "Starting EduTrack Collector (edutrack-collector) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let routes = RouteTable::from_config(&config).context("Invalid route table")?;
    info!(
        "Tracking {} routes, settle delay {}ms",
        routes.len(),
        config.tracking.settle_delay_ms
    );

    let pixel: Arc<dyn PixelSdk> = match HttpPixel::from_settings(&config.pixel)? {
        Some(pixel) => {
            info!("Forwarding pixel events to {}", pixel.endpoint());
            Arc::new(pixel)
        }
        None => {
            info!("No pixel endpoint configured; events go to the data layer only");
            Arc::new(NoopPixel)
        }
    };

    let port = args.port.unwrap_or(config.port);
    let addr = SocketAddr::new(args.bind, port);

    let state = AppState::new(config, routes, pixel);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("edutrack-collector listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
