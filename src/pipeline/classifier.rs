//! Error classification stage and failure accounting

use super::context::{MethodCategory, RequestContext};
use super::error::PipelineError;
use super::stage::{Next, Stage};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::error;

/// Process-wide failure counters keyed by `{kind}:{method}`.
///
/// Counts only ever increase for the life of the process.
#[derive(Default)]
pub struct ErrorStats {
    counts: RwLock<HashMap<String, u64>>,
}

impl ErrorStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one failure of `kind` in `method`
    pub fn record(&self, kind: &str, method: &str) {
        let mut counts = self.counts.write().unwrap();
        *counts.entry(format!("{}:{}", kind, method)).or_insert(0) += 1;
    }

    /// Count for a specific (kind, method) pair
    pub fn count(&self, kind: &str, method: &str) -> u64 {
        let counts = self.counts.read().unwrap();
        counts
            .get(&format!("{}:{}", kind, method))
            .copied()
            .unwrap_or(0)
    }

    /// Copy of all counters, for introspection
    pub fn snapshot(&self) -> HashMap<String, u64> {
        self.counts.read().unwrap().clone()
    }
}

/// Normalizes arbitrary failures into the typed taxonomy.
///
/// Already-typed errors pass through unchanged so a failure is classified
/// exactly once, by the stage closest to it. Untyped failures are wrapped
/// according to the method's category prefix, carrying the original message.
pub struct ErrorClassifierStage {
    transform_errors: bool,
    stats: std::sync::Arc<ErrorStats>,
}

impl ErrorClassifierStage {
    pub fn new(transform_errors: bool, stats: std::sync::Arc<ErrorStats>) -> Self {
        Self {
            transform_errors,
            stats,
        }
    }

    fn classify(&self, ctx: &RequestContext, err: PipelineError) -> PipelineError {
        if !self.transform_errors || err.is_typed() {
            return err;
        }

        let message = err.to_string();
        match ctx.category() {
            MethodCategory::Tools => PipelineError::ToolExecutionFailed(message),
            MethodCategory::Resources => PipelineError::ResourceAccessFailed(message),
            MethodCategory::Prompts => PipelineError::PromptExecutionFailed(message),
            MethodCategory::Other => PipelineError::GenericOperationFailed(message),
        }
    }
}

#[async_trait]
impl Stage for ErrorClassifierStage {
    fn name(&self) -> &str {
        "error_classifier"
    }

    async fn process(&self, ctx: &RequestContext, next: Next<'_>) -> Result<Value, PipelineError> {
        match next.run(ctx).await {
            Ok(result) => Ok(result),
            Err(err) => {
                // Accounting uses the original kind, before any wrapping
                self.stats.record(err.kind(), &ctx.method);
                error!("Error in {}: {}", ctx.method, err);

                Err(self.classify(ctx, err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::stage::Handler;
    use serde_json::json;
    use std::sync::Arc;

    struct FailHandler;

    #[async_trait]
    impl Handler for FailHandler {
        async fn handle(&self, _ctx: &RequestContext) -> Result<Value, PipelineError> {
            Err(PipelineError::Internal(anyhow::anyhow!("socket closed")))
        }
    }

    struct RateLimitedHandler;

    #[async_trait]
    impl Handler for RateLimitedHandler {
        async fn handle(&self, _ctx: &RequestContext) -> Result<Value, PipelineError> {
            Err(PipelineError::RateLimitExceeded { limit: 60 })
        }
    }

    async fn classify(method: &str, stats: Arc<ErrorStats>) -> PipelineError {
        let stage = ErrorClassifierStage::new(true, stats);
        let ctx = RequestContext::new(method, json!({}));
        let next = Next {
            stages: &[],
            handler: &FailHandler,
        };
        stage.process(&ctx, next).await.unwrap_err()
    }

    #[tokio::test]
    async fn test_wraps_by_method_prefix() {
        let stats = Arc::new(ErrorStats::new());

        let err = classify("tools/search", stats.clone()).await;
        assert!(matches!(err, PipelineError::ToolExecutionFailed(_)));
        assert!(err.to_string().contains("socket closed"));

        let err = classify("resources/read", stats.clone()).await;
        assert!(matches!(err, PipelineError::ResourceAccessFailed(_)));

        let err = classify("prompts/get", stats.clone()).await;
        assert!(matches!(err, PipelineError::PromptExecutionFailed(_)));

        let err = classify("ping", stats.clone()).await;
        assert!(matches!(err, PipelineError::GenericOperationFailed(_)));
    }

    #[tokio::test]
    async fn test_typed_errors_pass_through_unchanged() {
        let stats = Arc::new(ErrorStats::new());
        let stage = ErrorClassifierStage::new(true, stats.clone());
        let ctx = RequestContext::new("tools/search", json!({}));
        let next = Next {
            stages: &[],
            handler: &RateLimitedHandler,
        };

        let err = stage.process(&ctx, next).await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::RateLimitExceeded { limit: 60 }
        ));
        assert_eq!(stats.count("rate_limit_exceeded", "tools/search"), 1);
    }

    #[tokio::test]
    async fn test_transform_disabled_raises_original() {
        let stats = Arc::new(ErrorStats::new());
        let stage = ErrorClassifierStage::new(false, stats);
        let ctx = RequestContext::new("tools/search", json!({}));
        let next = Next {
            stages: &[],
            handler: &FailHandler,
        };

        let err = stage.process(&ctx, next).await.unwrap_err();
        assert!(matches!(err, PipelineError::Internal(_)));
    }

    #[tokio::test]
    async fn test_failure_counts_accumulate() {
        let stats = Arc::new(ErrorStats::new());
        classify("tools/search", stats.clone()).await;
        classify("tools/search", stats.clone()).await;

        assert_eq!(stats.count("internal", "tools/search"), 2);
    }
}
