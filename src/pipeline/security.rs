//! Security filtering stage

use super::context::RequestContext;
use super::error::PipelineError;
use super::stage::{Next, Stage};
use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

/// Substrings that mark a payload as suspicious. Matched case-insensitively
/// against the serialized message.
static SUSPICIOUS_PATTERNS: &[&str] = &[
    "script",
    "javascript",
    "eval",
    "exec",
    "system",
    "rm -rf",
    "drop table",
    "union select",
];

/// Scans serialized request payloads for a fixed blocklist of injection
/// markers. Runs innermost so the classifier and rate limiter see blocked
/// requests on their way back out.
pub struct SecurityStage {
    block_suspicious_requests: bool,
}

impl SecurityStage {
    pub fn new(block_suspicious_requests: bool) -> Self {
        Self {
            block_suspicious_requests,
        }
    }

    fn is_suspicious(&self, ctx: &RequestContext) -> bool {
        let payload = ctx.message.to_string().to_lowercase();
        SUSPICIOUS_PATTERNS.iter().any(|p| payload.contains(p))
    }
}

#[async_trait]
impl Stage for SecurityStage {
    fn name(&self) -> &str {
        "security"
    }

    async fn process(&self, ctx: &RequestContext, next: Next<'_>) -> Result<Value, PipelineError> {
        if self.is_suspicious(ctx) {
            warn!("Suspicious request detected: {}", ctx.method);

            if self.block_suspicious_requests {
                return Err(PipelineError::SecurityBlocked);
            }
        }

        next.run(ctx).await
    }
}
