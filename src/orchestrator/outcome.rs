//! Per-engine attempt records and orchestration summaries

use crate::results::{SearchOptions, SearchRecord};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// Classification of one adapter invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    /// At least one result
    Success,
    /// Empty result set, no error
    NoResults,
    /// The adapter raised
    Failed,
}

/// Outcome of invoking one engine adapter
#[derive(Debug, Clone, Serialize)]
pub struct EngineAttempt {
    pub status: AttemptStatus,
    pub count: usize,
    pub results: Vec<SearchRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl EngineAttempt {
    pub fn success(results: Vec<SearchRecord>) -> Self {
        Self {
            status: AttemptStatus::Success,
            count: results.len(),
            results,
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn no_results() -> Self {
        Self {
            status: AttemptStatus::NoResults,
            count: 0,
            results: Vec::new(),
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: AttemptStatus::Failed,
            count: 0,
            results: Vec::new(),
            error: Some(error.into()),
            timestamp: Utc::now(),
        }
    }
}

/// Aggregate view over one orchestration, echoing the request parameters
#[derive(Debug, Clone, Serialize)]
pub struct SearchSummary {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_engine: Option<String>,
    pub engines_tested: usize,
    pub successful_engines: usize,
    pub failed_engines: usize,
    pub total_results: usize,
    pub extract_content: bool,
    pub follow_links: bool,
    pub max_depth: u32,
    pub timestamp: DateTime<Utc>,
}

impl SearchSummary {
    pub(super) fn new(query: &str, options: &SearchOptions) -> Self {
        Self {
            query: query.to_string(),
            primary_engine: None,
            engines_tested: 0,
            successful_engines: 0,
            failed_engines: 0,
            total_results: 0,
            extract_content: options.extract_content,
            follow_links: options.follow_links,
            max_depth: options.max_depth,
            timestamp: Utc::now(),
        }
    }
}

/// Full result of one orchestration: per-engine attempts plus the summary.
///
/// A zero-success orchestration is still a well-formed value, never an error;
/// callers can tell "ran and found nothing" apart from a rejected request.
#[derive(Debug, Clone, Serialize)]
pub struct OrchestrationResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_engine: Option<String>,
    pub results: HashMap<String, EngineAttempt>,
    pub summary: SearchSummary,
}

impl OrchestrationResult {
    /// Successful results across all engines, in engine-position order
    pub fn successful_records(&self) -> Vec<&SearchRecord> {
        let mut records: Vec<&SearchRecord> = self
            .results
            .values()
            .filter(|a| a.status == AttemptStatus::Success)
            .flat_map(|a| a.results.iter())
            .collect();
        records.sort_by_key(|r| r.position);
        records
    }
}
