//! Search engine adapters
//!
//! One adapter per backend provider, all behind the uniform [`SearchEngine`]
//! capability the orchestrator consumes. Parsing specifics live entirely
//! inside each adapter.

mod bing;
mod duckduckgo;
mod traits;
mod yahoo;

pub use bing::BingEngine;
pub use duckduckgo::DuckDuckGoEngine;
pub use traits::SearchEngine;
pub use yahoo::YahooEngine;

use crate::config::OutgoingSettings;
use crate::network::HttpClient;
use anyhow::Result;
use std::sync::Arc;

/// Construct an adapter by configured name.
///
/// Each adapter owns its own HTTP client, reused across its sequential calls.
pub fn build_engine(name: &str, outgoing: &OutgoingSettings) -> Result<Arc<dyn SearchEngine>> {
    let client = HttpClient::with_settings(outgoing)?;

    match name {
        "bing" => Ok(Arc::new(BingEngine::new(client))),
        "duckduckgo" => Ok(Arc::new(DuckDuckGoEngine::new(client))),
        "yahoo" => Ok(Arc::new(YahooEngine::new(client))),
        other => anyhow::bail!("unknown search engine: {}", other),
    }
}
