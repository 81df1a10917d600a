//! Settings structures for RivalSearch-RS configuration

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main settings structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub pipeline: PipelineSettings,
    pub search: SearchSettings,
    pub outgoing: OutgoingSettings,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_yaml::from_str(&content)?;
        Ok(settings)
    }

    /// Merge with environment variables (RIVALSEARCH_* prefix)
    pub fn merge_env(&mut self) {
        if let Ok(val) = std::env::var("RIVALSEARCH_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("RIVALSEARCH_BIND_ADDRESS") {
            self.server.bind_address = val;
        }
        if let Ok(val) = std::env::var("RIVALSEARCH_MAX_REQUESTS_PER_MINUTE") {
            if let Ok(max) = val.parse() {
                self.pipeline.max_requests_per_minute = max;
            }
        }
        if let Ok(val) = std::env::var("RIVALSEARCH_BLOCK_SUSPICIOUS") {
            self.pipeline.block_suspicious_requests = val.parse().unwrap_or(true);
        }
        if let Ok(val) = std::env::var("RIVALSEARCH_VERIFY_SSL") {
            self.outgoing.verify_ssl = val.parse().unwrap_or(true);
        }
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Address to bind the server to
    pub bind_address: String,
    /// Server port
    pub port: u16,
    /// Instance name reported by introspection endpoints
    pub instance_name: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 8000,
            instance_name: "RivalSearch-RS".to_string(),
        }
    }
}

/// Cross-cutting request pipeline settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Maximum requests per minute admitted per client
    pub max_requests_per_minute: u32,
    /// Track rate limits per client instead of one global window
    pub per_client: bool,
    /// Log operations slower than the threshold at warning level
    pub log_slow_operations: bool,
    /// Slow-operation threshold in milliseconds
    pub slow_threshold_ms: u64,
    /// Echo request payloads into the log
    pub include_payloads: bool,
    /// Maximum echoed payload length before truncation
    pub max_payload_length: usize,
    /// Reject requests matching the security blocklist
    pub block_suspicious_requests: bool,
    /// Wrap untyped failures into protocol error kinds
    pub transform_errors: bool,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            max_requests_per_minute: 120,
            per_client: true,
            log_slow_operations: true,
            slow_threshold_ms: 2000,
            include_payloads: true,
            max_payload_length: 500,
            block_suspicious_requests: true,
            transform_errors: true,
        }
    }
}

/// Search behavior settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Engine names in priority order (first is the primary)
    pub engines: Vec<String>,
    /// Default number of results per engine
    pub num_results: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            engines: vec![
                "bing".to_string(),
                "duckduckgo".to_string(),
                "yahoo".to_string(),
            ],
            num_results: 10,
        }
    }
}

/// Outgoing HTTP request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutgoingSettings {
    /// Request timeout in seconds
    pub request_timeout: f64,
    /// Verify SSL certificates
    pub verify_ssl: bool,
    /// Maximum idle connections per host
    pub pool_maxsize: usize,
}

impl Default for OutgoingSettings {
    fn default() -> Self {
        Self {
            request_timeout: 30.0,
            verify_ssl: true,
            pool_maxsize: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();

        assert_eq!(settings.server.port, 8000);
        assert_eq!(settings.pipeline.max_requests_per_minute, 120);
        assert_eq!(settings.search.engines.len(), 3);
        assert_eq!(settings.search.engines[0], "bing");
    }

    #[test]
    fn test_parse_partial_yaml() {
        let yaml = r#"
server:
  port: 9090
pipeline:
  max_requests_per_minute: 30
  block_suspicious_requests: false
"#;
        let settings: Settings = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(settings.server.port, 9090);
        assert_eq!(settings.pipeline.max_requests_per_minute, 30);
        assert!(!settings.pipeline.block_suspicious_requests);
        // Untouched sections keep their defaults
        assert_eq!(settings.pipeline.max_payload_length, 500);
        assert_eq!(settings.search.num_results, 10);
    }
}
