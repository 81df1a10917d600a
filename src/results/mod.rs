//! Search result data model shared by engines, orchestrator, and tools

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// A single search result returned by an engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRecord {
    /// The URL of the result
    pub url: String,
    /// The title of the result
    pub title: String,
    /// Content snippet/description
    #[serde(default)]
    pub description: String,
    /// Position within the engine's result page (1-indexed)
    #[serde(default)]
    pub position: u32,
    /// Engine that returned this result
    pub engine: String,
    /// When the result was scraped
    pub timestamp: DateTime<Utc>,
    /// MD5 hash of the URL, used for deduplication across engines
    pub content_hash: String,
}

impl SearchRecord {
    /// Create a new record; hash and timestamp are derived
    pub fn new(
        url: impl Into<String>,
        title: impl Into<String>,
        engine: impl Into<String>,
    ) -> Self {
        let url = url.into();
        let content_hash = format!("{:x}", md5::compute(url.as_bytes()));

        Self {
            url,
            title: title.into(),
            description: String::new(),
            position: 0,
            engine: engine.into(),
            timestamp: Utc::now(),
            content_hash,
        }
    }

    /// Add a description snippet
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the result position
    pub fn with_position(mut self, position: u32) -> Self {
        self.position = position;
        self
    }

    /// Hostname of the result URL, if it parses
    pub fn domain(&self) -> Option<String> {
        Url::parse(&self.url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_string()))
    }
}

/// Parameters accepted by every engine's search capability
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    /// Number of results to return per engine
    pub num_results: usize,
    /// Whether to extract full page content
    pub extract_content: bool,
    /// Whether to follow internal links
    pub follow_links: bool,
    /// Maximum depth for link following
    pub max_depth: u32,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            num_results: 10,
            extract_content: true,
            follow_links: true,
            max_depth: 2,
        }
    }
}

impl SearchOptions {
    /// Options with a specific result count and everything else default
    pub fn with_num_results(num_results: usize) -> Self {
        Self {
            num_results,
            ..Default::default()
        }
    }
}
