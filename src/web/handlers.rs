//! HTTP request handlers

use super::state::AppState;
use crate::pipeline::{PipelineError, RequestContext};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Body of a POST /invoke request
#[derive(Debug, Deserialize)]
pub struct InvokeRequest {
    /// Namespaced method, e.g. `tools/search`
    pub method: String,
    /// Method parameters
    #[serde(default)]
    pub params: Value,
    /// Caller identity for per-client rate limiting
    pub client_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InvokeError {
    pub error: String,
    pub kind: &'static str,
}

/// Dispatch a method invocation through the request pipeline
pub async fn invoke(
    State(state): State<AppState>,
    Json(request): Json<InvokeRequest>,
) -> Response {
    let ctx = RequestContext::new(&request.method, request.params)
        .with_client_id(request.client_id)
        .with_source("http");

    match state.dispatcher.dispatch(&ctx).await {
        Ok(value) => Json(value).into_response(),
        Err(e) => {
            let body = InvokeError {
                error: e.to_string(),
                kind: e.kind(),
            };
            (error_status(&e), Json(body)).into_response()
        }
    }
}

/// Map a pipeline error to the HTTP status surfaced by `/invoke`
fn error_status(err: &PipelineError) -> StatusCode {
    match err {
        PipelineError::SecurityBlocked => StatusCode::FORBIDDEN,
        PipelineError::RateLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": crate::VERSION,
        "instance": state.instance_name(),
    }))
}

/// Performance aggregates per operation
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "operations": state.metrics.snapshot(),
    }))
}

/// Instance status: configured engines, pipeline stages, error counters
pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "instance": state.instance_name(),
        "engines": state.orchestrator.engine_names(),
        "stages": state.dispatcher.stage_names(),
        "errors": state.errors.snapshot(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocked_request_maps_to_forbidden() {
        assert_eq!(
            error_status(&PipelineError::SecurityBlocked),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_rate_limited_request_maps_to_too_many_requests() {
        assert_eq!(
            error_status(&PipelineError::RateLimitExceeded { limit: 60 }),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[test]
    fn test_other_errors_map_to_internal_server_error() {
        assert_eq!(
            error_status(&PipelineError::ToolExecutionFailed("boom".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            error_status(&PipelineError::Internal(anyhow::anyhow!("boom"))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
