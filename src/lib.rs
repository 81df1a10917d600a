//! RivalSearch-RS: a multi-provider search server with a composable
//! request pipeline.
//!
//! Requests flow through an onion of cross-cutting stages (security
//! filtering, error classification, rate limiting, performance
//! aggregation, timing, logging) before reaching the tool handlers,
//! which fan out or cascade across search engine adapters.

pub mod config;
pub mod engines;
pub mod network;
pub mod orchestrator;
pub mod pipeline;
pub mod results;
pub mod tools;
pub mod web;

pub use config::Settings;
pub use engines::SearchEngine;
pub use orchestrator::MultiSearchOrchestrator;
pub use pipeline::{Dispatcher, PipelineError, RequestContext};
pub use results::{SearchOptions, SearchRecord};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
