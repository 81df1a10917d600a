//! Request-processing pipeline
//!
//! Every tool, resource, and prompt invocation passes through an ordered chain
//! of cross-cutting stages (security filtering, error classification, rate
//! limiting, performance aggregation, timing, logging) before reaching the
//! application handler. Stages compose onion-style: the last registered stage
//! wraps all earlier ones.

mod classifier;
mod context;
mod dispatcher;
mod error;
mod logging;
mod metrics;
mod rate_limit;
mod security;
mod stage;
mod timing;

pub use classifier::{ErrorClassifierStage, ErrorStats};
pub use context::{MethodCategory, RequestContext};
pub use dispatcher::Dispatcher;
pub use error::PipelineError;
pub use logging::LoggingStage;
pub use metrics::{OperationMetrics, PerformanceMetrics, PerformanceStage};
pub use rate_limit::{RateLimitStage, RateLimiter};
pub use security::SecurityStage;
pub use stage::{Handler, Next, Stage};
pub use timing::TimingStage;

use crate::config::PipelineSettings;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Register the standard stage set on a dispatcher.
///
/// Registration order matters: the stage registered last runs outermost, so
/// logging sees every request first and the security filter is the final gate
/// before the handler.
pub fn register_default_stages(
    dispatcher: &mut Dispatcher,
    settings: &PipelineSettings,
    metrics: Arc<PerformanceMetrics>,
    errors: Arc<ErrorStats>,
) {
    dispatcher.register(Arc::new(SecurityStage::new(
        settings.block_suspicious_requests,
    )));
    dispatcher.register(Arc::new(ErrorClassifierStage::new(
        settings.transform_errors,
        errors,
    )));
    dispatcher.register(Arc::new(RateLimitStage::new(
        settings.max_requests_per_minute,
        settings.per_client,
    )));
    dispatcher.register(Arc::new(PerformanceStage::new(metrics)));
    dispatcher.register(Arc::new(TimingStage::new(
        settings.log_slow_operations,
        Duration::from_millis(settings.slow_threshold_ms),
    )));
    dispatcher.register(Arc::new(LoggingStage::new(
        settings.include_payloads,
        settings.max_payload_length,
    )));

    info!("Registered pipeline stages: {:?}", dispatcher.stage_names());
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{json, Value};

    struct EchoHandler;

    #[async_trait]
    impl Handler for EchoHandler {
        async fn handle(&self, ctx: &RequestContext) -> Result<Value, PipelineError> {
            Ok(ctx.message.clone())
        }
    }

    fn default_dispatcher(settings: &PipelineSettings) -> Dispatcher {
        let mut dispatcher = Dispatcher::new(Arc::new(EchoHandler));
        register_default_stages(
            &mut dispatcher,
            settings,
            Arc::new(PerformanceMetrics::new()),
            Arc::new(ErrorStats::new()),
        );
        dispatcher
    }

    #[tokio::test]
    async fn test_default_chain_passes_clean_request() {
        let dispatcher = default_dispatcher(&PipelineSettings::default());
        let ctx = RequestContext::new("tools/echo", json!({"q": "hello"}));

        let result = dispatcher.dispatch(&ctx).await.unwrap();
        assert_eq!(result, json!({"q": "hello"}));
    }

    #[tokio::test]
    async fn test_default_chain_blocks_suspicious_request() {
        let dispatcher = default_dispatcher(&PipelineSettings::default());
        let ctx = RequestContext::new("tools/echo", json!({"q": "union select * from t"}));

        let result = dispatcher.dispatch(&ctx).await;
        assert!(matches!(result, Err(PipelineError::SecurityBlocked)));
    }

    #[tokio::test]
    async fn test_default_chain_rate_limits() {
        let settings = PipelineSettings {
            max_requests_per_minute: 2,
            ..Default::default()
        };
        let dispatcher = default_dispatcher(&settings);

        for _ in 0..2 {
            let ctx = RequestContext::new("tools/echo", json!({}));
            assert!(dispatcher.dispatch(&ctx).await.is_ok());
        }

        let ctx = RequestContext::new("tools/echo", json!({}));
        let result = dispatcher.dispatch(&ctx).await;
        assert!(matches!(
            result,
            Err(PipelineError::RateLimitExceeded { limit: 2 })
        ));
    }

    #[tokio::test]
    async fn test_stage_registration_order() {
        let dispatcher = default_dispatcher(&PipelineSettings::default());
        assert_eq!(
            dispatcher.stage_names(),
            vec![
                "security",
                "error_classifier",
                "rate_limit",
                "performance",
                "timing",
                "logging"
            ]
        );
    }
}
