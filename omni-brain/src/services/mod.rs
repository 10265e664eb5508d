//! Clients for external data sources
//!
//! **[BRN-EXT-010]** Every outbound call carries a short fixed timeout; a
//! slow or unreachable source degrades to "no enrichment" and never stalls
//! a request. Failures surface as errors or empty results, the callers
//! decide how to degrade.

pub mod app_website;
pub mod knowledge;
pub mod web_search;

pub use app_website::AppWebsiteClient;
pub use knowledge::KnowledgeClient;
pub use web_search::{SearchCategory, SearchClient, SearchRecord};
