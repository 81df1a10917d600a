//! Stage trait and continuation type for the request pipeline

use super::context::RequestContext;
use super::error::PipelineError;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// One unit of cross-cutting request-processing behavior.
///
/// A stage receives the request context and a continuation over the remainder
/// of the chain. It may pass through, observe, short-circuit by returning an
/// error without invoking the continuation, or catch and transform errors the
/// continuation returns.
#[async_trait]
pub trait Stage: Send + Sync {
    /// Stage name, used in logs and introspection
    fn name(&self) -> &str;

    /// Process one request, calling `next` to run the rest of the chain
    async fn process(&self, ctx: &RequestContext, next: Next<'_>)
        -> Result<Value, PipelineError>;
}

/// Innermost application logic wrapped by the stage chain
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, ctx: &RequestContext) -> Result<Value, PipelineError>;
}

/// Continuation representing the remainder of the stage chain.
///
/// Built lazily at dispatch time over a slice of the registered stages; running
/// it peels the last stage off the slice, so later-registered stages wrap
/// earlier ones (the onion ordering the dispatcher guarantees).
pub struct Next<'a> {
    pub(super) stages: &'a [Arc<dyn Stage>],
    pub(super) handler: &'a dyn Handler,
}

impl<'a> Next<'a> {
    /// Run the remaining stages and the terminal handler
    pub async fn run(self, ctx: &RequestContext) -> Result<Value, PipelineError> {
        match self.stages.split_last() {
            Some((outer, rest)) => {
                outer
                    .process(
                        ctx,
                        Next {
                            stages: rest,
                            handler: self.handler,
                        },
                    )
                    .await
            }
            None => self.handler.handle(ctx).await,
        }
    }
}
