//! Aerovert Server - obstacle filtering and hazard analytics over HTTP

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use aerovert_server::api;
use aerovert_server::config::Config;
use aerovert_server::loops::refresh_loop;
use aerovert_server::state::AppState;
use aerovert_server::upstream::DatasetSource;
use anyhow::Result;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("aerovert_server=debug".parse()?))
        .init();

    tracing::info!("Starting Aerovert Server...");

    let config = Config::from_env();
    let port = config.server_port;
    let state = Arc::new(AppState::new(&config));
    let source = DatasetSource::from_config(&config)?;

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let refresh = tokio::spawn(refresh_loop::run_refresh_loop(
        state.clone(),
        source,
        Duration::from_secs(config.refresh_interval_secs.max(1)),
        shutdown_rx,
    ));

    let app = api::routes()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", err);
            }
            tracing::info!("Shutdown requested");
            let _ = shutdown_tx.send(());
        })
        .await?;

    refresh.await?;
    Ok(())
}
