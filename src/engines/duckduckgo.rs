//! DuckDuckGo search engine adapter

use super::traits::SearchEngine;
use crate::network::HttpClient;
use crate::results::{SearchOptions, SearchRecord};
use anyhow::Result;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use url::Url;

static RESULT_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("div.result").unwrap());
static TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a.result__a").unwrap());
static SNIPPET_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a.result__snippet").unwrap());

/// DuckDuckGo web search, scraped from the JavaScript-free HTML endpoint
pub struct DuckDuckGoEngine {
    client: HttpClient,
    base_url: String,
}

impl DuckDuckGoEngine {
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            base_url: "https://html.duckduckgo.com/html/".to_string(),
        }
    }

    /// Point the adapter at a different endpoint (used by tests)
    pub fn with_base_url(client: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Result links are routed through `duckduckgo.com/l/?uddg=<target>`;
    /// the real URL is percent-encoded in the `uddg` parameter.
    fn resolve_redirect(href: &str) -> String {
        if !href.contains("duckduckgo.com/l/") {
            return href.to_string();
        }

        let absolute = if let Some(rest) = href.strip_prefix("//") {
            format!("https://{}", rest)
        } else {
            href.to_string()
        };

        Url::parse(&absolute)
            .ok()
            .and_then(|u| {
                u.query_pairs()
                    .find(|(k, _)| k == "uddg")
                    .map(|(_, v)| v.into_owned())
            })
            .unwrap_or(absolute)
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

            let url = Self::resolve_redirect(href);
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
impl SearchEngine for DuckDuckGoEngine {
    fn name(&self) -> &str {
        "duckduckgo"
    }

    async fn search(&self, query: &str, options: &SearchOptions) -> Result<Vec<SearchRecord>> {
        let params = [("q", query.to_string())];

        let html = self.client.get_text(&self.base_url, &params).await?;
        Ok(self.parse_results(&html, options.num_results))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_PAGE: &str = r##"
        <html><body>
          <div class="result">
            <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Frust&rut=abc">Rust</a>
            <a class="result__snippet" href="#">Systems programming language.</a>
          </div>
          <div class="result">
            <a class="result__a" href="https://example.org/direct">Direct Link</a>
            <a class="result__snippet" href="#">No redirect here.</a>
          </div>
        </body></html>
    "##;

    #[test]
    fn test_parse_resolves_redirects() {
        let engine = DuckDuckGoEngine::new(HttpClient::new().unwrap());
        let records = engine.parse_results(SAMPLE_PAGE, 10);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].url, "https://example.com/rust");
        assert_eq!(records[1].url, "https://example.org/direct");
    }

    #[test]
    fn test_resolve_redirect_passthrough() {
        let direct = "https://example.com/x";
        assert_eq!(DuckDuckGoEngine::resolve_redirect(direct), direct);
    }

    #[test]
    fn test_empty_page_yields_no_results() {
        let engine = DuckDuckGoEngine::new(HttpClient::new().unwrap());
        let records = engine.parse_results("<html><body></body></html>", 10);
        assert!(records.is_empty());
    }
}
