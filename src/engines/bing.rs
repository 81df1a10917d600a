//! Bing search engine adapter

use super::traits::SearchEngine;
use crate::network::HttpClient;
use crate::results::{SearchOptions, SearchRecord};
use anyhow::Result;
use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use url::Url;

static RESULT_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("li.b_algo").unwrap());
static TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("h2 a").unwrap());
static SNIPPET_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());

/// Bing web search, scraped from the HTML result page
pub struct BingEngine {
    client: HttpClient,
    base_url: String,
}

impl BingEngine {
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            base_url: "https://www.bing.com/search".to_string(),
        }
    }

    /// Point the adapter at a different endpoint (used by tests)
    pub fn with_base_url(client: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Resolve Bing's click-tracking redirects.
    ///
    /// Result links frequently point at `bing.com/ck/a?...&u=a1<base64>&...`
    /// where the target URL sits base64-encoded in the `u` parameter behind an
    /// `a1` prefix.
    fn decode_redirect(raw: &str) -> String {
        if !raw.starts_with("https://www.bing.com/ck/a") {
            return raw.to_string();
        }

        let encoded = Url::parse(raw).ok().and_then(|u| {
            u.query_pairs()
                .find(|(k, _)| k == "u")
                .map(|(_, v)| v.into_owned())
        });

        if let Some(encoded) = encoded {
            let stripped = encoded.strip_prefix("a1").unwrap_or(&encoded);
            if let Ok(bytes) = URL_SAFE_NO_PAD.decode(stripped.trim_end_matches('=')) {
                if let Ok(decoded) = String::from_utf8(bytes) {
                    return decoded;
                }
            }
        }

        raw.to_string()
    }

    fn parse_results(&self, html: &str, limit: usize) -> Vec<SearchRecord> {
        let document = Html::parse_document(html);
        let mut records = Vec::new();

        for element in document.select(&RESULT_SELECTOR) {
            let title_elem = match element.select(&TITLE_SELECTOR).next() {
                Some(t) => t,
                None => continue,
            };

            let title = title_elem.text().collect::<String>().trim().to_string();
            let raw_url = title_elem.value().attr("href").unwrap_or_default();
            if title.is_empty() || raw_url.is_empty() || raw_url.starts_with('/') {
                continue;
            }

            let url = Self::decode_redirect(raw_url);
            let description = element
                .select(&SNIPPET_SELECTOR)
                .next()
                .map(|s| s.text().collect::<String>().trim().to_string())
                .unwrap_or_default();

            let position = records.len() as u32 + 1;
            records.push(
                SearchRecord::new(url, title, self.name())
                    .with_description(description)
                    .with_position(position),
            );

            if records.len() >= limit {
                break;
            }
        }

        records
    }
}

#[async_trait]
impl SearchEngine for BingEngine {
    fn name(&self) -> &str {
        "bing"
    }

    async fn search(&self, query: &str, options: &SearchOptions) -> Result<Vec<SearchRecord>> {
        let params = [
            ("q", query.to_string()),
            ("count", options.num_results.to_string()),
        ];

        let html = self.client.get_text(&self.base_url, &params).await?;
        Ok(self.parse_results(&html, options.num_results))
    }
}
