//! Yahoo search engine adapter

use super::traits::SearchEngine;
use crate::network::HttpClient;
use crate::results::{SearchOptions, SearchRecord};
use anyhow::Result;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

static RESULT_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("div.algo").unwrap());
static TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("h3.title a").unwrap());
static SNIPPET_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("div.compText p").unwrap());

/// Yahoo web search, scraped from the HTML result page
pub struct YahooEngine {
    client: HttpClient,
    base_url: String,
}

impl YahooEngine {
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            base_url: "https://search.yahoo.com/search".to_string(),
        }
    }

    /// Point the adapter at a different endpoint (used by tests)
    pub fn with_base_url(client: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Unwrap Yahoo's redirect URLs of the form
    /// `r.search.yahoo.com/...;/RU=<percent-encoded target>/RK=...`.
    fn unwrap_redirect(href: &str) -> String {
        if let Some(idx) = href.find("/RU=") {
            let rest = &href[idx + 4..];
            let end = rest.find("/RK=").unwrap_or(rest.len());
            if let Ok(decoded) = urlencoding::decode(&rest[..end]) {
                return decoded.into_owned();
            }
        }
        href.to_string()
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
            let href = title_elem.value().attr("href").unwrap_or_default();
            if title.is_empty() || href.is_empty() {
                continue;
            }

            let url = Self::unwrap_redirect(href);
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
impl SearchEngine for YahooEngine {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn search(&self, query: &str, options: &SearchOptions) -> Result<Vec<SearchRecord>> {
        let params = [
            ("p", query.to_string()),
            ("n", options.num_results.to_string()),
        ];

        let html = self.client.get_text(&self.base_url, &params).await?;
        Ok(self.parse_results(&html, options.num_results))
    }
}
