//! RivalSearch-RS: multi-provider search server
//!
//! This is the main entry point for the application.

use anyhow::Result;
use rivalsearch_rs::{
    config,
    orchestrator::MultiSearchOrchestrator,
    pipeline::{self, Dispatcher, ErrorStats, PerformanceMetrics},
    tools::ToolRouter,
    web::{create_router, AppState},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    info!("Starting RivalSearch-RS v{}", rivalsearch_rs::VERSION);

    // Load configuration
    let settings = Arc::new(config::load()?);
    info!(
        "Loaded configuration for instance: {}",
        settings.server.instance_name
    );

    // Build the engine registry and orchestrator
    let orchestrator = Arc::new(MultiSearchOrchestrator::from_settings(
        &settings.search,
        &settings.outgoing,
    )?);
    info!("Loaded {} search engines", orchestrator.len());

    // Assemble the request pipeline around the tool router
    let metrics = Arc::new(PerformanceMetrics::new());
    let errors = Arc::new(ErrorStats::new());
    let mut dispatcher = Dispatcher::new(Arc::new(ToolRouter::new(orchestrator.clone())));
    pipeline::register_default_stages(
        &mut dispatcher,
        &settings.pipeline,
        metrics.clone(),
        errors.clone(),
    );

    // Create application state and router
    let state = AppState::new(
        settings.clone(),
        Arc::new(dispatcher),
        metrics,
        errors,
        orchestrator.clone(),
    );
    let app = create_router(state);

    // Bind address
    let addr = SocketAddr::new(settings.server.bind_address.parse()?, settings.server.port);
    info!("Starting server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    // Release engine resources before exit, even when serving failed
    orchestrator.shutdown().await;
    info!("Shutdown complete");

    Ok(served?)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
