//! Slow-operation timing stage

use super::context::RequestContext;
use super::error::PipelineError;
use super::stage::{Next, Stage};
use async_trait::async_trait;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Measures wall-clock duration of each request and flags slow operations
pub struct TimingStage {
    log_slow_operations: bool,
    slow_threshold: Duration,
}

impl TimingStage {
    pub fn new(log_slow_operations: bool, slow_threshold: Duration) -> Self {
        Self {
            log_slow_operations,
            slow_threshold,
        }
    }
}

#[async_trait]
impl Stage for TimingStage {
    fn name(&self) -> &str {
        "timing"
    }

    async fn process(&self, ctx: &RequestContext, next: Next<'_>) -> Result<Value, PipelineError> {
        let start = Instant::now();
        let result = next.run(ctx).await;
        let duration_ms = start.elapsed().as_secs_f64() * 1000.0;

        match &result {
            Ok(_) => {
                if self.log_slow_operations && start.elapsed() > self.slow_threshold {
                    warn!(
                        "Slow operation detected: {} took {:.2}ms",
                        ctx.method, duration_ms
                    );
                } else {
                    info!("Operation completed: {} in {:.2}ms", ctx.method, duration_ms);
                }
            }
            Err(err) => {
                error!(
                    "Operation failed: {} after {:.2}ms: {}",
                    ctx.method, duration_ms, err
                );
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::stage::Handler;
    use serde_json::json;

    struct OkHandler;

    #[async_trait]
    impl Handler for OkHandler {
        async fn handle(&self, _ctx: &RequestContext) -> Result<Value, PipelineError> {
            Ok(json!("ok"))
        }
    }

    struct FailHandler;

    #[async_trait]
    impl Handler for FailHandler {
        async fn handle(&self, _ctx: &RequestContext) -> Result<Value, PipelineError> {
            Err(PipelineError::Internal(anyhow::anyhow!("boom")))
        }
    }

    #[tokio::test]
    async fn test_result_passes_through() {
        let stage = TimingStage::new(true, Duration::from_millis(1000));
        let ctx = RequestContext::new("tools/test", json!({}));

        let result = stage
            .process(
                &ctx,
                Next {
                    stages: &[],
                    handler: &OkHandler,
                },
            )
            .await
            .unwrap();
        assert_eq!(result, json!("ok"));
    }

    #[tokio::test]
    async fn test_failure_passes_through() {
        let stage = TimingStage::new(true, Duration::from_millis(1000));
        let ctx = RequestContext::new("tools/test", json!({}));

        let result = stage
            .process(
                &ctx,
                Next {
                    stages: &[],
                    handler: &FailHandler,
                },
            )
            .await;
        assert!(result.is_err());
    }
}
