//! Storyloom — HTTP service for script analysis and interactive playtests.
//!
//! The service is the host environment for playback sessions: it owns them,
//! serializes the requests made against each one, and runs the timers each
//! session asks for.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod timers;

use axum::Router;

use crate::state::AppState;

/// Builds the application router with every route mounted.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/analysis", routes::analysis::router())
        .nest("/api/v1/playtests", routes::playtest::router())
        .with_state(state)
}
