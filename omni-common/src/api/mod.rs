//! Shared HTTP API types
//!
//! Payload shapes served to the launcher and dashboard clients.

pub mod types;

pub use types::{
    ActionResponse, ActionResult, AskRequest, AskResponse, InstallMethod, InstallPlan,
    InstallPlanRequest, QueryRequest, SearchHit, SearchResponse,
};
