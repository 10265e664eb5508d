//! Navigation resolution for SEARCH directives
//!
//! Primary: top general-search hit as a direct link. Fallback: a generic
//! search-engine redirect embedding the literal query, so a SEARCH
//! directive always produces something clickable.

use super::Enrichment;
use crate::services::web_search::{SearchCategory, SearchClient};
use async_trait::async_trait;
use omni_common::api::ActionResult;
use std::sync::Arc;
use std::time::Duration;

pub struct NavigationResolver {
    search: Arc<SearchClient>,
    timeout: Duration,
}

impl NavigationResolver {
    pub fn new(search: Arc<SearchClient>, timeout: Duration) -> Self {
        Self { search, timeout }
    }
}

/// The "I'm feeling lucky" style redirect used when no hit came back.
pub fn redirect_link(query: &str) -> ActionResult {
    ActionResult::Link {
        url: format!("https://duckduckgo.com/?q=!ducky+{}", query),
        title: format!("Search {}", query),
        description: "Web Search".to_string(),
    }
}

#[async_trait]
impl Enrichment for NavigationResolver {
    async fn primary(&self, query: &str) -> Option<ActionResult> {
        let records = self
            .search
            .search(query, SearchCategory::General, self.timeout)
            .await
            .ok()?;
        let first = records.into_iter().next()?;
        // A hit without a URL is useless as a link; fall through to the
        // redirect instead of emitting a malformed card
        let url = first.url?;
        Some(ActionResult::Link {
            url,
            title: first.title.unwrap_or_else(|| "Link".to_string()),
            description: first.content,
        })
    }

    async fn fallback(&self, query: &str) -> Option<ActionResult> {
        Some(redirect_link(query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_embeds_the_literal_query() {
        match redirect_link("rust book") {
            ActionResult::Link { url, title, description } => {
                assert_eq!(url, "https://duckduckgo.com/?q=!ducky+rust book");
                assert_eq!(title, "Search rust book");
                assert_eq!(description, "Web Search");
            }
            other => panic!("expected link, got {:?}", other),
        }
    }
}
