//! Enrichment resolvers
//!
//! **[BRN-RES-010]** Each resolver is a primary-lookup-then-fallback pair
//! against external data sources. The contract lives in the `Enrichment`
//! trait: the fallback runs only when the primary came back empty or
//! errored, and a resolver that finds nothing yields `None`; the caller
//! drops that line, the batch continues.

pub mod navigation;
pub mod person;
pub mod place;

pub use navigation::NavigationResolver;
pub use person::PersonResolver;
pub use place::PlaceResolver;

use async_trait::async_trait;
use omni_common::api::ActionResult;

/// Primary/fallback lookup contract.
#[async_trait]
pub trait Enrichment: Send + Sync {
    async fn primary(&self, query: &str) -> Option<ActionResult>;

    async fn fallback(&self, query: &str) -> Option<ActionResult>;

    /// Primary first; fallback only on an empty primary.
    async fn resolve(&self, query: &str) -> Option<ActionResult> {
        if let Some(hit) = self.primary(query).await {
            return Some(hit);
        }
        self.fallback(query).await
    }
}
