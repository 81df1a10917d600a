//! Typed error taxonomy for the request pipeline

use thiserror::Error;

/// Errors surfaced by the pipeline to callers.
///
/// Every variant except `Internal` is a protocol-level kind: once a failure has
/// been classified it passes outer stages unchanged. `Internal` carries an
/// arbitrary failure that has not yet crossed the classifier stage.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("request blocked due to security concerns")]
    SecurityBlocked,

    #[error("rate limit exceeded: maximum {limit} requests per minute allowed")]
    RateLimitExceeded { limit: u32 },

    #[error("tool execution failed: {0}")]
    ToolExecutionFailed(String),

    #[error("resource access failed: {0}")]
    ResourceAccessFailed(String),

    #[error("prompt execution failed: {0}")]
    PromptExecutionFailed(String),

    #[error("operation failed: {0}")]
    GenericOperationFailed(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl PipelineError {
    /// Stable kind label used for error accounting
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SecurityBlocked => "security_blocked",
            Self::RateLimitExceeded { .. } => "rate_limit_exceeded",
            Self::ToolExecutionFailed(_) => "tool_execution_failed",
            Self::ResourceAccessFailed(_) => "resource_access_failed",
            Self::PromptExecutionFailed(_) => "prompt_execution_failed",
            Self::GenericOperationFailed(_) => "operation_failed",
            Self::Internal(_) => "internal",
        }
    }

    /// Whether this error already carries a protocol-level kind
    pub fn is_typed(&self) -> bool {
        !matches!(self, Self::Internal(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_vs_internal() {
        assert!(PipelineError::SecurityBlocked.is_typed());
        assert!(PipelineError::RateLimitExceeded { limit: 10 }.is_typed());
        assert!(!PipelineError::Internal(anyhow::anyhow!("boom")).is_typed());
    }

    #[test]
    fn test_internal_display_is_transparent() {
        let err = PipelineError::Internal(anyhow::anyhow!("connection reset"));
        assert_eq!(err.to_string(), "connection reset");
    }
}
