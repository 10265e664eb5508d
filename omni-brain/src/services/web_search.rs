//! Search-aggregator client (SearXNG)
//!
//! **[BRN-EXT-020]** General and map category queries against the local
//! SearXNG instance, normalized to `SearchRecord`. Also renders the
//! three-source context block injected into deep answers.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// How many hits feed the deep-answer context block.
const CONTEXT_RESULT_LIMIT: usize = 3;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search client build failed: {0}")]
    Build(String),
    #[error("search request failed: {0}")]
    Request(String),
    #[error("search engine returned status {0}")]
    Api(u16),
    #[error("malformed search response: {0}")]
    Malformed(String),
}

/// Aggregator search category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchCategory {
    General,
    Map,
}

impl SearchCategory {
    fn as_str(self) -> &'static str {
        match self {
            SearchCategory::General => "general",
            SearchCategory::Map => "map",
        }
    }
}

/// One normalized search hit. `content` falls back to the `snippet`
/// field; map-category hits may carry coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRecord {
    pub title: Option<String>,
    pub url: Option<String>,
    pub content: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct SearxResponse {
    #[serde(default)]
    results: Vec<SearxHit>,
}

#[derive(Debug, Deserialize)]
struct SearxHit {
    title: Option<String>,
    url: Option<String>,
    content: Option<String>,
    snippet: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

impl From<SearxHit> for SearchRecord {
    fn from(hit: SearxHit) -> Self {
        let content = hit
            .content
            .filter(|c| !c.trim().is_empty())
            .or(hit.snippet)
            .unwrap_or_default();
        SearchRecord {
            title: hit.title,
            url: hit.url,
            content,
            latitude: hit.latitude,
            longitude: hit.longitude,
        }
    }
}

/// Client for the aggregator's JSON API. Timeouts are per call; the
/// navigation path runs tighter than the context path.
pub struct SearchClient {
    http: Client,
    base_url: String,
}

impl SearchClient {
    pub fn new(base_url: &str) -> Result<Self, SearchError> {
        let http = Client::builder()
            .build()
            .map_err(|e| SearchError::Build(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.to_string(),
        })
    }

    /// Run one query. Returns normalized records in engine order.
    pub async fn search(
        &self,
        query: &str,
        category: SearchCategory,
        timeout: Duration,
    ) -> Result<Vec<SearchRecord>, SearchError> {
        info!(query = %query, category = category.as_str(), "Searching aggregator");

        let response = self
            .http
            .get(&self.base_url)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("categories", category.as_str()),
                ("language", "en-US"),
            ])
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| SearchError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Api(status.as_u16()));
        }

        let parsed: SearxResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Malformed(e.to_string()))?;

        debug!(hits = parsed.results.len(), "Aggregator answered");
        Ok(parsed.results.into_iter().map(SearchRecord::from).collect())
    }
}

/// Render the deep-answer context block from search records: up to three
/// sources, entries without content skipped.
pub fn context_block(records: &[SearchRecord]) -> String {
    let mut sources = Vec::new();
    for record in records.iter().take(CONTEXT_RESULT_LIMIT) {
        if record.content.is_empty() {
            continue;
        }
        sources.push(format!(
            "Source: {} ({})\nContent: {}",
            record.title.as_deref().unwrap_or("No Title"),
            record.url.as_deref().unwrap_or(" "),
            record.content
        ));
    }
    if sources.is_empty() {
        return "No search results found.".to_string();
    }
    sources.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, url: &str, content: &str) -> SearchRecord {
        SearchRecord {
            title: Some(title.to_string()),
            url: Some(url.to_string()),
            content: content.to_string(),
            latitude: None,
            longitude: None,
        }
    }

    #[test]
    fn normalization_falls_back_to_snippet() {
        let raw = r#"{"results": [
            {"title": "A", "url": "https://a.example", "content": "body"},
            {"title": "B", "url": "https://b.example", "snippet": "snip"},
            {"title": "C", "url": "https://c.example", "content": "  ", "snippet": "kept"}
        ]}"#;
        let parsed: SearxResponse = serde_json::from_str(raw).unwrap();
        let records: Vec<SearchRecord> = parsed.results.into_iter().map(Into::into).collect();

        assert_eq!(records[0].content, "body");
        assert_eq!(records[1].content, "snip");
        assert_eq!(records[2].content, "kept");
    }

    #[test]
    fn map_hits_keep_coordinates() {
        let raw = r#"{"results": [
            {"title": "Brandenburg Gate", "url": "https://osm.example", "content": "Pariser Platz",
             "latitude": 52.5163, "longitude": 13.3777}
        ]}"#;
        let parsed: SearxResponse = serde_json::from_str(raw).unwrap();
        let record = SearchRecord::from(parsed.results.into_iter().next().unwrap());
        assert_eq!(record.latitude, Some(52.5163));
        assert_eq!(record.longitude, Some(13.3777));
    }

    #[test]
    fn context_block_takes_three_sources() {
        let records = vec![
            record("A", "https://a", "one"),
            record("B", "https://b", "two"),
            record("C", "https://c", "three"),
            record("D", "https://d", "four"),
        ];
        let block = context_block(&records);
        assert!(block.contains("Source: A (https://a)\nContent: one"));
        assert!(block.contains("Source: C"));
        assert!(!block.contains("Source: D"));
    }

    #[test]
    fn empty_results_yield_the_no_results_line() {
        assert_eq!(context_block(&[]), "No search results found.");
    }

    #[test]
    fn missing_results_field_parses_as_empty() {
        let parsed: SearxResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.results.is_empty());
    }
}
