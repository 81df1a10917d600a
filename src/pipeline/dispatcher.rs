//! Pipeline dispatcher composing stages into an ordered chain

use super::context::RequestContext;
use super::error::PipelineError;
use super::stage::{Handler, Next, Stage};
use serde_json::Value;
use std::sync::Arc;

/// Composes registered stages plus a terminal handler into a single chain
/// invoked per request.
///
/// Ordering invariant: the last-registered stage becomes the outermost wrapper.
/// Given stages registered `[S1, S2, .., Sn]`, a request executes
/// `Sn -> .. -> S1 -> handler -> S1 -> .. -> Sn`. A stage failing before it
/// calls the continuation short-circuits everything inside it; outer stages
/// still observe the failure on the way back up.
pub struct Dispatcher {
    stages: Vec<Arc<dyn Stage>>,
    handler: Arc<dyn Handler>,
}

impl Dispatcher {
    /// Create a dispatcher around the terminal handler
    pub fn new(handler: Arc<dyn Handler>) -> Self {
        Self {
            stages: Vec::new(),
            handler,
        }
    }

    /// Append a stage to the chain.
    ///
    /// Not safe to call concurrently with `dispatch`; register everything at
    /// construction time.
    pub fn register(&mut self, stage: Arc<dyn Stage>) {
        self.stages.push(stage);
    }

    /// Names of registered stages, in registration order
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run one request through the full chain
    pub async fn dispatch(&self, ctx: &RequestContext) -> Result<Value, PipelineError> {
        Next {
            stages: &self.stages,
            handler: self.handler.as_ref(),
        }
        .run(ctx)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Stage that records its pre- and post-processing order
    struct ProbeStage {
        label: String,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl ProbeStage {
        fn new(label: &str, log: Arc<Mutex<Vec<String>>>) -> Arc<Self> {
            Arc::new(Self {
                label: label.to_string(),
                log,
            })
        }
    }

    #[async_trait]
    impl Stage for ProbeStage {
        fn name(&self) -> &str {
            &self.label
        }

        async fn process(
            &self,
            ctx: &RequestContext,
            next: Next<'_>,
        ) -> Result<Value, PipelineError> {
            self.log.lock().unwrap().push(format!("{}:pre", self.label));
            let result = next.run(ctx).await;
            let outcome = if result.is_ok() { "post" } else { "err" };
            self.log
                .lock()
                .unwrap()
                .push(format!("{}:{}", self.label, outcome));
            result
        }
    }

    struct OkHandler;

    #[async_trait]
    impl Handler for OkHandler {
        async fn handle(&self, _ctx: &RequestContext) -> Result<Value, PipelineError> {
            Ok(json!("done"))
        }
    }

    struct FailHandler;

    #[async_trait]
    impl Handler for FailHandler {
        async fn handle(&self, _ctx: &RequestContext) -> Result<Value, PipelineError> {
            Err(PipelineError::Internal(anyhow::anyhow!("handler failed")))
        }
    }

    #[tokio::test]
    async fn test_last_registered_stage_runs_outermost() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut dispatcher = Dispatcher::new(Arc::new(OkHandler));
        dispatcher.register(ProbeStage::new("a", log.clone()));
        dispatcher.register(ProbeStage::new("b", log.clone()));
        dispatcher.register(ProbeStage::new("c", log.clone()));

        let ctx = RequestContext::new("tools/test", json!({}));
        let result = dispatcher.dispatch(&ctx).await;

        assert!(result.is_ok());
        assert_eq!(
            *log.lock().unwrap(),
            vec!["c:pre", "b:pre", "a:pre", "a:post", "b:post", "c:post"]
        );
    }

    #[tokio::test]
    async fn test_handler_failure_unwinds_innermost_first() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut dispatcher = Dispatcher::new(Arc::new(FailHandler));
        dispatcher.register(ProbeStage::new("a", log.clone()));
        dispatcher.register(ProbeStage::new("b", log.clone()));
        dispatcher.register(ProbeStage::new("c", log.clone()));

        let ctx = RequestContext::new("tools/test", json!({}));
        let result = dispatcher.dispatch(&ctx).await;

        assert!(result.is_err());
        // Every stage pre-processed, then the failure propagated from the
        // innermost stage back out to the outermost.
        assert_eq!(
            *log.lock().unwrap(),
            vec!["c:pre", "b:pre", "a:pre", "a:err", "b:err", "c:err"]
        );
    }

    #[tokio::test]
    async fn test_empty_chain_calls_handler_directly() {
        let dispatcher = Dispatcher::new(Arc::new(OkHandler));
        let ctx = RequestContext::new("tools/test", json!({}));

        let result = dispatcher.dispatch(&ctx).await.unwrap();
        assert_eq!(result, json!("done"));
    }

    /// Stage that short-circuits without calling the continuation
    struct VetoStage;

    #[async_trait]
    impl Stage for VetoStage {
        fn name(&self) -> &str {
            "veto"
        }

        async fn process(
            &self,
            _ctx: &RequestContext,
            _next: Next<'_>,
        ) -> Result<Value, PipelineError> {
            Err(PipelineError::SecurityBlocked)
        }
    }

    #[tokio::test]
    async fn test_short_circuit_skips_inner_stages() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut dispatcher = Dispatcher::new(Arc::new(OkHandler));
        dispatcher.register(ProbeStage::new("inner", log.clone()));
        dispatcher.register(Arc::new(VetoStage));
        dispatcher.register(ProbeStage::new("outer", log.clone()));

        let ctx = RequestContext::new("tools/test", json!({}));
        let result = dispatcher.dispatch(&ctx).await;

        assert!(matches!(result, Err(PipelineError::SecurityBlocked)));
        // The inner stage never ran; the outer stage observed the failure.
        assert_eq!(*log.lock().unwrap(), vec!["outer:pre", "outer:err"]);
    }
}
