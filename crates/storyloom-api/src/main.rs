//! Storyloom API server entry point.

use std::error::Error;
use std::sync::Arc;

use storyloom_api::config::ServerConfig;
use storyloom_api::state::AppState;
use storyloom_core::clock::SystemClock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Storyloom playtest server");

    let config = ServerConfig::from_env()?;
    let addr = config.addr()?;
    let app_state = AppState::new(&config, Arc::new(SystemClock));

    // The editor runs on its own origin, so CORS stays open.
    let app = storyloom_api::app(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    tracing::info!(
        %addr,
        max_sessions = config.max_sessions,
        "Listening"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
