//! Knowledge-summary API client (Wikipedia REST)
//!
//! Backs the person fallback. Only "standard" pages are accepted;
//! disambiguation and missing pages yield no summary rather than a
//! half-filled card.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Knowledge-summary endpoint; the page key is appended.
pub const DEFAULT_BASE_URL: &str = "https://en.wikipedia.org/api/rest_v1/page/summary";

const USER_AGENT: &str = "OmniOS/1.0 (internal-dev)";

/// Page type accepted for enrichment.
const STANDARD_PAGE: &str = "standard";

#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error("knowledge client build failed: {0}")]
    Build(String),
    #[error("knowledge request failed: {0}")]
    Request(String),
    #[error("knowledge API returned status {0}")]
    Api(u16),
    #[error("malformed knowledge response: {0}")]
    Malformed(String),
}

/// Accepted summary of a standard knowledge page.
#[derive(Debug, Clone, PartialEq)]
pub struct KnowledgeSummary {
    pub title: String,
    pub extract: String,
    pub page_url: Option<String>,
    pub thumbnail: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    #[serde(rename = "type")]
    page_type: String,
    title: Option<String>,
    extract: Option<String>,
    content_urls: Option<ContentUrls>,
    thumbnail: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct ContentUrls {
    desktop: Option<DesktopUrls>,
}

#[derive(Debug, Deserialize)]
struct DesktopUrls {
    page: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    source: Option<String>,
}

impl SummaryResponse {
    /// `None` for anything that isn't a standard page.
    fn into_summary(self, fallback_title: &str) -> Option<KnowledgeSummary> {
        if self.page_type != STANDARD_PAGE {
            return None;
        }
        Some(KnowledgeSummary {
            title: self.title.unwrap_or_else(|| fallback_title.to_string()),
            extract: self.extract.unwrap_or_default(),
            page_url: self.content_urls.and_then(|c| c.desktop).and_then(|d| d.page),
            thumbnail: self.thumbnail.and_then(|t| t.source),
        })
    }
}

pub struct KnowledgeClient {
    http: Client,
    base_url: String,
    timeout: Duration,
}

impl KnowledgeClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, KnowledgeError> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| KnowledgeError::Build(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    /// Fetch the page summary for a name; spaces become underscores in
    /// the page key. `Ok(None)` covers both missing pages (404) and
    /// non-standard page types.
    pub async fn summary(&self, name: &str) -> Result<Option<KnowledgeSummary>, KnowledgeError> {
        let page_key = name.trim().replace(' ', "_");
        let url = format!("{}/{}", self.base_url, page_key);

        let response = self
            .http
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| KnowledgeError::Request(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 404 {
            debug!(page = %page_key, "No knowledge page");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(KnowledgeError::Api(status.as_u16()));
        }

        let parsed: SummaryResponse = response
            .json()
            .await
            .map_err(|e| KnowledgeError::Malformed(e.to_string()))?;

        Ok(parsed.into_summary(name))
    }
}
