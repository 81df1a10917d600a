//! Application state shared across handlers

use crate::config::Settings;
use crate::orchestrator::MultiSearchOrchestrator;
use crate::pipeline::{Dispatcher, ErrorStats, PerformanceMetrics};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Global settings
    pub settings: Arc<Settings>,
    /// Request pipeline
    pub dispatcher: Arc<Dispatcher>,
    /// Performance aggregates collected by the pipeline
    pub metrics: Arc<PerformanceMetrics>,
    /// Error counters collected by the pipeline
    pub errors: Arc<ErrorStats>,
    /// Search orchestrator
    pub orchestrator: Arc<MultiSearchOrchestrator>,
}

impl AppState {
    pub fn new(
        settings: Arc<Settings>,
        dispatcher: Arc<Dispatcher>,
        metrics: Arc<PerformanceMetrics>,
        errors: Arc<ErrorStats>,
        orchestrator: Arc<MultiSearchOrchestrator>,
    ) -> Self {
        Self {
            settings,
            dispatcher,
            metrics,
            errors,
            orchestrator,
        }
    }

    /// Get instance name
    pub fn instance_name(&self) -> &str {
        &self.settings.server.instance_name
    }
}
