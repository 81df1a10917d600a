//! Multi-engine search orchestration
//!
//! Holds a priority-ordered registry of engine adapters and queries them
//! strictly sequentially with cascading fallback. Sequential querying is a
//! deliberate latency trade-off: hitting backends one at a time keeps each
//! request pattern polite enough to survive anti-bot defenses.

mod outcome;

pub use outcome::{AttemptStatus, EngineAttempt, OrchestrationResult, SearchSummary};

use crate::config::{OutgoingSettings, SearchSettings};
use crate::engines::{build_engine, SearchEngine};
use crate::results::SearchOptions;
use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Orchestrator-level errors
#[derive(Debug, Error)]
pub enum SearchError {
    /// One adapter failed; recorded in its attempt, non-fatal to the run
    #[error("engine {engine} query failed: {message}")]
    EngineQueryFailed { engine: String, message: String },

    /// No adapter in the registry produced a result
    #[error("all search engines exhausted for query '{query}'")]
    AllEnginesExhausted { query: String },
}

/// One entry in the engine registry
pub struct EngineDescriptor {
    pub name: String,
    /// Lower rank is tried first
    pub priority: u32,
    pub engine: Arc<dyn SearchEngine>,
}

impl EngineDescriptor {
    pub fn new(priority: u32, engine: Arc<dyn SearchEngine>) -> Self {
        Self {
            name: engine.name().to_string(),
            priority,
            engine,
        }
    }
}

/// Orchestrates searches across multiple engines with fallback support.
///
/// The registry is fixed at construction and never mutated afterwards.
pub struct MultiSearchOrchestrator {
    engines: Vec<EngineDescriptor>,
}

impl MultiSearchOrchestrator {
    /// Create an orchestrator over a set of adapters, ordered by priority
    pub fn new(mut engines: Vec<EngineDescriptor>) -> Self {
        engines.sort_by_key(|e| e.priority);
        Self { engines }
    }

    /// Build the configured engine registry from settings
    pub fn from_settings(search: &SearchSettings, outgoing: &OutgoingSettings) -> Result<Self> {
        let mut engines = Vec::with_capacity(search.engines.len());
        for (rank, name) in search.engines.iter().enumerate() {
            engines.push(EngineDescriptor::new(
                rank as u32,
                build_engine(name, outgoing)?,
            ));
        }
        Ok(Self::new(engines))
    }

    /// Registered engine names, in priority order
    pub fn engine_names(&self) -> Vec<&str> {
        self.engines.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }

    /// Query the highest-priority adapter; on any miss, fan out to the rest.
    ///
    /// A primary hit short-circuits: no other adapter is queried. A primary
    /// error or empty result falls through to `search_all_engines` with
    /// fallback enabled. Each tier is independent; nothing from the primary
    /// attempt carries into the fan-out.
    pub async fn search_with_fallback(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> OrchestrationResult {
        if let Some(primary) = self.engines.first() {
            info!("Trying primary engine {} for: {}", primary.name, query);

            match primary.engine.search(query, options).await {
                Ok(records) if !records.is_empty() => {
                    info!(
                        "Primary engine {} successful: {} results",
                        primary.name,
                        records.len()
                    );

                    let attempt = EngineAttempt::success(records);
                    let mut summary = SearchSummary::new(query, options);
                    summary.primary_engine = Some(primary.name.clone());
                    summary.engines_tested = 1;
                    summary.successful_engines = 1;
                    summary.total_results = attempt.count;

                    let mut results = HashMap::new();
                    results.insert(primary.name.clone(), attempt);

                    return OrchestrationResult {
                        primary_engine: Some(primary.name.clone()),
                        results,
                        summary,
                    };
                }
                Ok(_) => {
                    warn!("Primary engine {} returned no results", primary.name);
                }
                Err(err) => {
                    warn!("Primary engine {} failed: {}", primary.name, err);
                }
            }
        }

        info!("Primary engine exhausted, trying fallback engines");
        self.search_all_engines(query, options, true).await
    }

    /// Query every adapter in priority order, recording an attempt for each.
    ///
    /// With `fallback_on_failure` disabled, the first adapter error stops the
    /// iteration; remaining adapters are not attempted. The summary's
    /// `engines_tested` always reflects the configured registry size.
    pub async fn search_all_engines(
        &self,
        query: &str,
        options: &SearchOptions,
        fallback_on_failure: bool,
    ) -> OrchestrationResult {
        let mut results = HashMap::new();
        let mut summary = SearchSummary::new(query, options);
        summary.engines_tested = self.engines.len();

        for descriptor in &self.engines {
            info!("Searching {} for: {}", descriptor.name, query);

            match descriptor.engine.search(query, options).await {
                Ok(records) if !records.is_empty() => {
                    info!(
                        "{} search successful: {} results",
                        descriptor.name,
                        records.len()
                    );
                    summary.successful_engines += 1;
                    summary.total_results += records.len();
                    results.insert(descriptor.name.clone(), EngineAttempt::success(records));
                }
                Ok(_) => {
                    warn!("{} returned no results", descriptor.name);
                    results.insert(descriptor.name.clone(), EngineAttempt::no_results());
                }
                Err(err) => {
                    let failure = SearchError::EngineQueryFailed {
                        engine: descriptor.name.clone(),
                        message: err.to_string(),
                    };
                    error!("{}", failure);
                    summary.failed_engines += 1;
                    results.insert(
                        descriptor.name.clone(),
                        EngineAttempt::failed(failure.to_string()),
                    );

                    if !fallback_on_failure {
                        break;
                    }
                }
            }
        }

        OrchestrationResult {
            primary_engine: None,
            results,
            summary,
        }
    }

    /// Close every adapter's session.
    ///
    /// Close attempts are independent: a failure on one adapter is logged and
    /// the rest are still closed.
    pub async fn shutdown(&self) {
        for descriptor in &self.engines {
            if let Err(err) = descriptor.engine.close().await {
                debug!("Error closing engine {}: {}", descriptor.name, err);
            }
        }
    }
}
