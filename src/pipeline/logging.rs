//! Request/response logging stage

use super::context::RequestContext;
use super::error::PipelineError;
use super::stage::{Next, Stage};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error, info};

const TRUNCATION_MARKER: &str = "... [truncated]";

/// Logs every request on entry and its outcome on exit, optionally echoing a
/// truncated copy of the payload. Registered last, so it is the outermost
/// stage and sees every request first.
pub struct LoggingStage {
    include_payloads: bool,
    max_payload_length: usize,
}

impl LoggingStage {
    pub fn new(include_payloads: bool, max_payload_length: usize) -> Self {
        Self {
            include_payloads,
            max_payload_length,
        }
    }
}

/// Truncate a payload echo to `max_len` characters, marking the cut
fn truncate_payload(payload: &str, max_len: usize) -> String {
    if payload.chars().count() <= max_len {
        return payload.to_string();
    }
    let truncated: String = payload.chars().take(max_len).collect();
    format!("{}{}", truncated, TRUNCATION_MARKER)
}

#[async_trait]
impl Stage for LoggingStage {
    fn name(&self) -> &str {
        "logging"
    }

    async fn process(&self, ctx: &RequestContext, next: Next<'_>) -> Result<Value, PipelineError> {
        info!(
            "Processing {} from {} (category: {})",
            ctx.method,
            ctx.source,
            ctx.category().as_str()
        );

        if self.include_payloads {
            let payload = truncate_payload(&ctx.message.to_string(), self.max_payload_length);
            debug!("Message payload: {}", payload);
        }

        match next.run(ctx).await {
            Ok(result) => {
                info!("Completed {} successfully", ctx.method);
                Ok(result)
            }
            Err(err) => {
                error!("Failed {}: {}: {}", ctx.method, err.kind(), err);
                Err(err)
            }
        }
    }
}
