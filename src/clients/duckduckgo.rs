//! DuckDuckGo HTML search provider (no API key required).

use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use percent_encoding::percent_decode_str;
use scraper::{ElementRef, Html, Selector};

use crate::clients::traits::{SearchError, SearchProvider};
use crate::schemas::SearchResult;

const DDG_HTML_ENDPOINT: &str = "https://html.duckduckgo.com/html/";
const USER_AGENT: &str = concat!("trade-opportunities/", env!("CARGO_PKG_VERSION"));

static RESULT_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.result").expect("static selector"));
static TITLE_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a.result__a").expect("static selector"));
static SNIPPET_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".result__snippet").expect("static selector"));
static NO_RESULTS_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".no-results").expect("static selector"));

pub struct DuckDuckGoSearch {
    client: reqwest::Client,
    endpoint: String,
}

impl DuckDuckGoSearch {
    pub fn new(timeout_ms: u64) -> anyhow::Result<Self> {
        Self::with_endpoint(DDG_HTML_ENDPOINT, timeout_ms)
    }

    pub fn with_endpoint(endpoint: impl Into<String>, timeout_ms: u64) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build search HTTP client: {}", e))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoSearch {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        tracing::debug!("DuckDuckGo query (max_results={}): {}", max_results, query);

        let resp = self
            .client
            .post(&self.endpoint)
            .form(&[("q", query)])
            .header("Accept", "text/html")
            .send()
            .await
            .map_err(|e| SearchError::Http(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SearchError::Status {
                status: status.as_u16(),
            });
        }

        let body = resp
            .text()
            .await
            .map_err(|e| SearchError::Http(e.to_string()))?;

        // Html is !Send; keep parsing out of the async state.
        parse_results(&body, max_results)
    }

    fn name(&self) -> &'static str {
        "duckduckgo"
    }
}

/// Extract up to `max` organic results from a DuckDuckGo HTML results page.
///
/// A page with neither result blocks nor the no-results marker (a captcha or
/// a changed layout) is a [`SearchError::Parse`].
pub fn parse_results(html: &str, max: usize) -> Result<Vec<SearchResult>, SearchError> {
    let doc = Html::parse_document(html);
    if doc.select(&RESULT_SEL).next().is_none() {
        if doc.select(&NO_RESULTS_SEL).next().is_some() {
            return Ok(Vec::new());
        }
        return Err(SearchError::Parse(
            "page has no result blocks".to_string(),
        ));
    }

    let mut results = Vec::new();
    for block in doc.select(&RESULT_SEL) {
        if results.len() >= max {
            break;
        }
        // Sponsored entries
        if block
            .value()
            .classes()
            .any(|c| c == "result--ad" || c == "result--ad--small")
        {
            continue;
        }
        let Some(anchor) = block.select(&TITLE_SEL).next() else {
            continue;
        };
        let title = element_text(&anchor);
        let link = anchor
            .value()
            .attr("href")
            .map(unwrap_redirect)
            .unwrap_or_default();
        if title.is_empty() || link.is_empty() {
            continue;
        }
        let snippet = block
            .select(&SNIPPET_SEL)
            .next()
            .map(|el| element_text(&el))
            .unwrap_or_default();

        results.push(SearchResult {
            title,
            link,
            snippet,
        });
    }

    Ok(results)
}

fn element_text(el: &ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// DDG wraps result URLs in redirect links; extract and decode the real URL.
pub fn unwrap_redirect(href: &str) -> String {
    if let Some(pos) = href.find("uddg=") {
        let start = pos + 5;
        let end = href[start..]
            .find('&')
            .map(|i| start + i)
            .unwrap_or(href.len());
        let encoded = &href[start..end];
        if !encoded.is_empty() {
            return percent_decode_str(encoded).decode_utf8_lossy().into_owned();
        }
    }
    if let Some(rest) = href.strip_prefix("//") {
        return format!("https://{rest}");
    }
    href.to_string()
}
