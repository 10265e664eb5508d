//! Best-effort "official website" scrape
//!
//! Backs the INSTALL card's website field: one POST against the
//! search engine's static (non-JS) result page, first result anchor out.
//! Absence is not an error; the card just ships without a website.

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Static (non-JS) result page of the search engine.
pub const DEFAULT_BASE_URL: &str = "https://html.duckduckgo.com/html/";

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.114 Safari/537.36";

// First result link in the static DDG result page
static RESULT_ANCHOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"class="result__a" href="([^"]+)""#).unwrap());

/// Extract the first result href from a static result page.
pub fn first_result_href(html: &str) -> Option<String> {
    RESULT_ANCHOR
        .captures(html)
        .map(|caps| caps[1].to_string())
}

pub struct AppWebsiteClient {
    http: Client,
    base_url: String,
    timeout: Duration,
}

impl AppWebsiteClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let http = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");
        Self {
            http,
            base_url: base_url.to_string(),
            timeout,
        }
    }

    /// Look up "<app> official website" and return the top hit, if any.
    pub async fn official_website(&self, app_name: &str) -> Option<String> {
        let query = format!("{} official website", app_name);

        // Form POST emulates the plain search form submission
        let response = self
            .http
            .post(&self.base_url)
            .form(&[("q", query.as_str())])
            .timeout(self.timeout)
            .send()
            .await
            .ok()?;

        if !response.status().is_success() {
            debug!(status = response.status().as_u16(), "Website scrape refused");
            return None;
        }

        let html = response.text().await.ok()?;
        first_result_href(&html)
    }
}
