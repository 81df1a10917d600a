//! Engine adapter capability contract

use crate::results::{SearchOptions, SearchRecord};
use anyhow::Result;
use async_trait::async_trait;

/// Uniform interface to one backend search provider.
///
/// Implementations must return an error on transport or parse failure and an
/// empty vector when the query legitimately yields nothing; the orchestrator
/// relies on that distinction to classify attempts.
#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// Engine name
    fn name(&self) -> &str;

    /// Run one search against the backend
    async fn search(&self, query: &str, options: &SearchOptions) -> Result<Vec<SearchRecord>>;

    /// Release the adapter's network session
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
