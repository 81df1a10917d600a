//! HTTP client for making requests to search engines

use super::user_agent::{accept_html, accept_language, random_user_agent};
use crate::config::OutgoingSettings;
use anyhow::Result;
use reqwest::Client;
use std::time::Duration;

/// HTTP client wrapper with browser-like defaults and connection pooling.
///
/// Each engine adapter owns one of these; the underlying reqwest client reuses
/// connections across the adapter's sequential calls.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self> {
        Self::with_settings(&OutgoingSettings::default())
    }

    /// Create a new HTTP client with custom settings
    pub fn with_settings(settings: &OutgoingSettings) -> Result<Self> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs_f64(settings.request_timeout))
            .pool_max_idle_per_host(settings.pool_maxsize)
            .cookie_store(true)
            .gzip(true)
            .brotli(true);

        if !settings.verify_ssl {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder.build()?;

        Ok(Self { client })
    }

    /// Fetch a URL and return the response body as text.
    ///
    /// Non-2xx status codes are errors; the engines rely on that to distinguish
    /// a blocked or failing backend from a legitimately empty result page.
    pub async fn get_text(&self, url: &str, params: &[(&str, String)]) -> Result<String> {
        let response = self
            .client
            .get(url)
            .header("User-Agent", random_user_agent())
            .header("Accept", accept_html())
            .header("Accept-Language", accept_language("en"))
            .header("DNT", "1")
            .header("Upgrade-Insecure-Requests", "1")
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("HTTP error {} from {}", status, url);
        }

        Ok(response.text().await?)
    }
}
