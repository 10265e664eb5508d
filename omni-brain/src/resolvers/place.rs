//! Place enrichment
//!
//! Map-category search only; there is no fallback source for places, an
//! empty primary just yields no action.

use super::Enrichment;
use crate::services::web_search::{SearchCategory, SearchClient, SearchRecord};
use async_trait::async_trait;
use omni_common::api::ActionResult;
use std::sync::Arc;
use std::time::Duration;

pub struct PlaceResolver {
    search: Arc<SearchClient>,
    timeout: Duration,
}

impl PlaceResolver {
    pub fn new(search: Arc<SearchClient>, timeout: Duration) -> Self {
        Self { search, timeout }
    }
}

fn place_from_record(query: &str, record: SearchRecord) -> ActionResult {
    ActionResult::Place {
        name: record.title.unwrap_or_else(|| query.to_string()),
        address: record.content,
        latitude: record.latitude,
        longitude: record.longitude,
        url: record.url,
        image: None,
    }
}

#[async_trait]
impl Enrichment for PlaceResolver {
    async fn primary(&self, query: &str) -> Option<ActionResult> {
        let records = self
            .search
            .search(query, SearchCategory::Map, self.timeout)
            .await
            .ok()?;
        let first = records.into_iter().next()?;
        Some(place_from_record(query, first))
    }

    async fn fallback(&self, _query: &str) -> Option<ActionResult> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_maps_onto_a_place_card() {
        let record = SearchRecord {
            title: Some("Brandenburg Gate".to_string()),
            url: Some("https://osm.example/node/1".to_string()),
            content: "Pariser Platz, Berlin".to_string(),
            latitude: Some(52.5163),
            longitude: Some(13.3777),
        };
        assert_eq!(
            place_from_record("brandenburg gate", record),
            ActionResult::Place {
                name: "Brandenburg Gate".to_string(),
                address: "Pariser Platz, Berlin".to_string(),
                latitude: Some(52.5163),
                longitude: Some(13.3777),
                url: Some("https://osm.example/node/1".to_string()),
                image: None,
            }
        );
    }
}
