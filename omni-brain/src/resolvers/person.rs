//! Person enrichment
//!
//! Primary: general-category aggregator search, first hit. Fallback: the
//! knowledge-summary API, accepted only for standard pages.

use super::Enrichment;
use crate::services::knowledge::{KnowledgeClient, KnowledgeSummary};
use crate::services::web_search::{SearchCategory, SearchClient, SearchRecord};
use async_trait::async_trait;
use omni_common::api::ActionResult;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub struct PersonResolver {
    search: Arc<SearchClient>,
    knowledge: Arc<KnowledgeClient>,
    timeout: Duration,
}

impl PersonResolver {
    pub fn new(
        search: Arc<SearchClient>,
        knowledge: Arc<KnowledgeClient>,
        timeout: Duration,
    ) -> Self {
        Self {
            search,
            knowledge,
            timeout,
        }
    }
}

/// Normalize a search hit into a person card. Images come only from the
/// knowledge fallback; the aggregator does not return portraits.
fn person_from_record(name: &str, record: SearchRecord) -> ActionResult {
    ActionResult::Person {
        name: record.title.unwrap_or_else(|| name.to_string()),
        description: record.content,
        url: record.url,
        image: None,
    }
}

fn person_from_summary(summary: KnowledgeSummary) -> ActionResult {
    ActionResult::Person {
        name: summary.title,
        description: summary.extract,
        url: summary.page_url,
        image: summary.thumbnail,
    }
}

#[async_trait]
impl Enrichment for PersonResolver {
    async fn primary(&self, name: &str) -> Option<ActionResult> {
        let records = self
            .search
            .search(name, SearchCategory::General, self.timeout)
            .await
            .ok()?;
        let first = records.into_iter().next()?;
        Some(person_from_record(name, first))
    }

    async fn fallback(&self, name: &str) -> Option<ActionResult> {
        match self.knowledge.summary(name).await {
            Ok(Some(summary)) => Some(person_from_summary(summary)),
            Ok(None) => None,
            Err(e) => {
                debug!(error = %e, "Knowledge fallback failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_maps_onto_a_person_card() {
        let record = SearchRecord {
            title: Some("Ada Lovelace".to_string()),
            url: Some("https://example.org/ada".to_string()),
            content: "English mathematician".to_string(),
            latitude: None,
            longitude: None,
        };
        let card = person_from_record("ada lovelace", record);
        assert_eq!(
            card,
            ActionResult::Person {
                name: "Ada Lovelace".to_string(),
                description: "English mathematician".to_string(),
                url: Some("https://example.org/ada".to_string()),
                image: None,
            }
        );
    }

    #[test]
    fn query_name_backfills_a_missing_title() {
        let record = SearchRecord {
            title: None,
            url: None,
            content: String::new(),
            latitude: None,
            longitude: None,
        };
        match person_from_record("Grace Hopper", record) {
            ActionResult::Person { name, .. } => assert_eq!(name, "Grace Hopper"),
            other => panic!("expected person, got {:?}", other),
        }
    }

    #[test]
    fn summary_keeps_the_thumbnail() {
        let summary = KnowledgeSummary {
            title: "Ada Lovelace".to_string(),
            extract: "Mathematician.".to_string(),
            page_url: Some("https://en.wikipedia.org/wiki/Ada_Lovelace".to_string()),
            thumbnail: Some("https://upload.example/ada.jpg".to_string()),
        };
        match person_from_summary(summary) {
            ActionResult::Person { image, .. } => {
                assert_eq!(image.as_deref(), Some("https://upload.example/ada.jpg"))
            }
            other => panic!("expected person, got {:?}", other),
        }
    }
}
