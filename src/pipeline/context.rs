//! Request context passed through the stage chain

use serde_json::Value;
use std::time::Instant;

/// Category of an inbound method, parsed from its `{category}/{action}` prefix.
///
/// The prefix is the sole input to the error classifier's wrapping decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodCategory {
    Tools,
    Resources,
    Prompts,
    Other,
}

impl MethodCategory {
    /// Parse the category from a full method name
    pub fn of(method: &str) -> Self {
        if method.starts_with("tools/") {
            Self::Tools
        } else if method.starts_with("resources/") {
            Self::Resources
        } else if method.starts_with("prompts/") {
            Self::Prompts
        } else {
            Self::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tools => "tools",
            Self::Resources => "resources",
            Self::Prompts => "prompts",
            Self::Other => "other",
        }
    }
}

/// Immutable context for one inbound invocation.
///
/// Created at dispatch entry, passed by reference through the stage chain, and
/// discarded after the chain returns.
#[derive(Debug)]
pub struct RequestContext {
    /// Namespaced method name, e.g. `tools/multi_engine_search`
    pub method: String,
    /// Where the message came from
    pub source: String,
    /// Originating client, when the transport provides one
    pub client_id: Option<String>,
    /// Raw request payload
    pub message: Value,
    /// Monotonic arrival timestamp
    pub received_at: Instant,
}

impl RequestContext {
    /// Create a context for an inbound message
    pub fn new(method: impl Into<String>, message: Value) -> Self {
        Self {
            method: method.into(),
            source: "client".to_string(),
            client_id: None,
            message,
            received_at: Instant::now(),
        }
    }

    /// Attach a client identifier
    pub fn with_client_id(mut self, client_id: Option<String>) -> Self {
        self.client_id = client_id;
        self
    }

    /// Override the message source label
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Category of this request's method
    pub fn category(&self) -> MethodCategory {
        MethodCategory::of(&self.method)
    }
}
