//! Route definitions

use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Invocation route
        .route("/invoke", post(handlers::invoke))
        // Observability routes
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .route("/status", get(handlers::status))
        // Add middleware
        .layer(cors)
        // Add state
        .with_state(state)
}
