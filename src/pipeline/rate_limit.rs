//! Sliding-window rate limiting stage

use super::context::RequestContext;
use super::error::PipelineError;
use super::stage::{Next, Stage};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::warn;

/// Client id used when per-client tracking is disabled or the transport did
/// not supply one.
const GLOBAL_CLIENT: &str = "global";

/// Trailing interval over which request counts are evaluated
const WINDOW: Duration = Duration::from_secs(60);

/// Per-client sliding-window request counter.
///
/// Each client maps to an ordered sequence of admission timestamps, pruned to
/// the trailing window before every check. A rejected request is never
/// recorded, so hammering a full window does not extend the lockout.
pub struct RateLimiter {
    max_per_minute: u32,
    windows: RwLock<HashMap<String, Vec<Instant>>>,
}

impl RateLimiter {
    pub fn new(max_per_minute: u32) -> Self {
        Self {
            max_per_minute,
            windows: RwLock::new(HashMap::new()),
        }
    }

    /// Admit or reject a request arriving at `now`.
    ///
    /// Prune, check, and record happen under one write guard so concurrent
    /// requests cannot interleave between the count and the append.
    pub fn try_acquire(&self, client_id: &str, now: Instant) -> Result<(), PipelineError> {
        let mut windows = self.windows.write().unwrap();
        let window = windows.entry(client_id.to_string()).or_default();

        window.retain(|&t| now.saturating_duration_since(t) < WINDOW);

        if window.len() as u32 >= self.max_per_minute {
            return Err(PipelineError::RateLimitExceeded {
                limit: self.max_per_minute,
            });
        }

        window.push(now);
        Ok(())
    }
}

/// Stage that applies the rate limiter to every request
pub struct RateLimitStage {
    limiter: RateLimiter,
    per_client: bool,
}

impl RateLimitStage {
    pub fn new(max_per_minute: u32, per_client: bool) -> Self {
        Self {
            limiter: RateLimiter::new(max_per_minute),
            per_client,
        }
    }

    fn client_id<'a>(&self, ctx: &'a RequestContext) -> &'a str {
        if self.per_client {
            ctx.client_id.as_deref().unwrap_or(GLOBAL_CLIENT)
        } else {
            GLOBAL_CLIENT
        }
    }
}

#[async_trait]
impl Stage for RateLimitStage {
    fn name(&self) -> &str {
        "rate_limit"
    }

    async fn process(&self, ctx: &RequestContext, next: Next<'_>) -> Result<Value, PipelineError> {
        let client_id = self.client_id(ctx);

        if let Err(err) = self.limiter.try_acquire(client_id, Instant::now()) {
            warn!("Rate limit exceeded for client: {}", client_id);
            return Err(err);
        }

        next.run(ctx).await
    }
}
