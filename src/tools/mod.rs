//! Tool implementations behind the pipeline's terminal handler
//!
//! The router maps namespaced method names onto the search tools; everything
//! here runs innermost, after every pipeline stage has admitted the request.

use crate::orchestrator::{MultiSearchOrchestrator, SearchError};
use crate::pipeline::{Handler, PipelineError, RequestContext};
use crate::results::SearchOptions;
use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

/// Terminal handler routing method names to tool implementations
pub struct ToolRouter {
    orchestrator: Arc<MultiSearchOrchestrator>,
}

impl ToolRouter {
    pub fn new(orchestrator: Arc<MultiSearchOrchestrator>) -> Self {
        Self { orchestrator }
    }

    /// Multi-engine search: fan-out across every engine, or cascading
    /// fallback when `use_fallback` is set.
    async fn multi_engine_search(&self, ctx: &RequestContext) -> Result<Value, PipelineError> {
        let params: MultiSearchParams = parse_params(ctx)?;
        let options = SearchOptions {
            num_results: params.num_results,
            extract_content: params.extract_content,
            follow_links: params.follow_links,
            max_depth: params.max_depth,
        };

        info!("Starting multi-engine search for: {}", params.query);

        let outcome = if params.use_fallback {
            self.orchestrator
                .search_with_fallback(&params.query, &options)
                .await
        } else {
            self.orchestrator
                .search_all_engines(&params.query, &options, true)
                .await
        };

        info!(
            "Search completed: {} total results from {} engines",
            outcome.summary.total_results, outcome.summary.successful_engines
        );

        serde_json::to_value(outcome)
            .map_err(|e| PipelineError::Internal(anyhow::anyhow!("serializing outcome: {}", e)))
    }

    /// Single search with cascading fallback, flattened into one result list.
    ///
    /// Unlike the multi-engine tool, total failure here is an error: callers
    /// asked for results, not a report.
    async fn search(&self, ctx: &RequestContext) -> Result<Value, PipelineError> {
        let params: SearchParams = parse_params(ctx)?;
        let options = SearchOptions {
            num_results: params.num_results,
            extract_content: true,
            follow_links: false,
            max_depth: 1,
        };

        let outcome = self
            .orchestrator
            .search_with_fallback(&params.query, &options)
            .await;

        if outcome.summary.total_results == 0 {
            return Err(PipelineError::Internal(
                SearchError::AllEnginesExhausted {
                    query: params.query,
                }
                .into(),
            ));
        }

        let records = outcome.successful_records();
        let engines: HashSet<&str> = records.iter().map(|r| r.engine.as_str()).collect();

        Ok(json!({
            "status": "success",
            "results": records,
            "metadata": {
                "query": params.query,
                "total_results": records.len(),
                "unique_engines": engines.len(),
                "primary_engine": outcome.primary_engine,
                "timestamp": Utc::now(),
            },
        }))
    }
}

#[async_trait]
impl Handler for ToolRouter {
    async fn handle(&self, ctx: &RequestContext) -> Result<Value, PipelineError> {
        match ctx.method.as_str() {
            "tools/multi_engine_search" => self.multi_engine_search(ctx).await,
            "tools/search" => self.search(ctx).await,
            other => Err(PipelineError::Internal(anyhow::anyhow!(
                "unknown method: {}",
                other
            ))),
        }
    }
}

/// Deserialize tool parameters out of the raw message payload
fn parse_params<T: DeserializeOwned>(ctx: &RequestContext) -> Result<T, PipelineError> {
    serde_json::from_value(ctx.message.clone()).map_err(|e| {
        PipelineError::Internal(anyhow::anyhow!("invalid parameters for {}: {}", ctx.method, e))
    })
}

#[derive(Debug, Deserialize)]
struct MultiSearchParams {
    query: String,
    #[serde(default = "default_num_results")]
    num_results: usize,
    #[serde(default = "default_true")]
    extract_content: bool,
    #[serde(default = "default_true")]
    follow_links: bool,
    #[serde(default = "default_max_depth")]
    max_depth: u32,
    #[serde(default = "default_true")]
    use_fallback: bool,
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    query: String,
    #[serde(default = "default_num_results")]
    num_results: usize,
}

fn default_num_results() -> usize {
    10
}

fn default_true() -> bool {
    true
}

fn default_max_depth() -> u32 {
    2
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::SearchEngine;
    use crate::orchestrator::EngineDescriptor;
    use crate::results::SearchRecord;

    struct FixedEngine {
        label: &'static str,
        results: usize,
    }

    #[async_trait]
    impl SearchEngine for FixedEngine {
        fn name(&self) -> &str {
            self.label
        }

        async fn search(
            &self,
            query: &str,
            _options: &SearchOptions,
        ) -> anyhow::Result<Vec<SearchRecord>> {
            Ok((1..=self.results)
                .map(|i| {
                    SearchRecord::new(
                        format!("https://example.com/{}", i),
                        format!("{} {}", query, i),
                        self.label,
                    )
                    .with_position(i as u32)
                })
                .collect())
        }
    }

    fn router(results: usize) -> ToolRouter {
        let orchestrator = MultiSearchOrchestrator::new(vec![EngineDescriptor::new(
            0,
            Arc::new(FixedEngine {
                label: "bing",
                results,
            }) as Arc<dyn SearchEngine>,
        )]);
        ToolRouter::new(Arc::new(orchestrator))
    }

    #[tokio::test]
    async fn test_multi_engine_search_returns_summary() {
        let router = router(3);
        let ctx = RequestContext::new("tools/multi_engine_search", json!({"query": "rust"}));

        let value = router.handle(&ctx).await.unwrap();

        assert_eq!(value["summary"]["total_results"], 3);
        assert_eq!(value["summary"]["successful_engines"], 1);
        assert_eq!(value["results"]["bing"]["status"], "success");
    }

    #[tokio::test]
    async fn test_search_flattens_results() {
        let router = router(2);
        let ctx = RequestContext::new("tools/search", json!({"query": "rust"}));

        let value = router.handle(&ctx).await.unwrap();

        assert_eq!(value["status"], "success");
        assert_eq!(value["metadata"]["total_results"], 2);
        assert_eq!(value["results"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_search_with_no_results_is_exhausted() {
        let router = router(0);
        let ctx = RequestContext::new("tools/search", json!({"query": "rust"}));

        let err = router.handle(&ctx).await.unwrap_err();
        assert!(err.to_string().contains("exhausted"));
    }

    #[tokio::test]
    async fn test_missing_query_is_an_error() {
        let router = router(1);
        let ctx = RequestContext::new("tools/search", json!({"num_results": 5}));

        assert!(router.handle(&ctx).await.is_err());
    }

    #[tokio::test]
    async fn test_unknown_method_is_an_error() {
        let router = router(1);
        let ctx = RequestContext::new("tools/nope", json!({}));

        let err = router.handle(&ctx).await.unwrap_err();
        assert!(err.to_string().contains("unknown method"));
    }
}
