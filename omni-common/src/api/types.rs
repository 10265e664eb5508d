//! Shared API request/response types
//!
//! Types crossing the HTTP boundary between the brain service and its two
//! consumers, the desktop launcher and the boot dashboard. The launcher
//! renders `ActionResult` cards directly from these JSON shapes, so field
//! names here are part of the wire contract.

use serde::{Deserialize, Serialize};

// ========================================
// Requests
// ========================================

/// Body for `/ask`, `/search` and `/action`.
///
/// `query` is optional on the wire; an absent or empty query is answered
/// with an empty-result success, not an error.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub query: String,
}

/// Alias kept for readability at the `/ask` handler.
pub type AskRequest = QueryRequest;

/// Body for `/install_plan`. The app name is required; an empty name is a
/// 400, unlike the query endpoints.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InstallPlanRequest {
    #[serde(default)]
    pub app_name: String,
}

// ========================================
// Action results
// ========================================

/// One resolved action, tagged by `type` on the wire.
///
/// Produced in classifier line order; the launcher treats index 0 as the
/// primary/default action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ActionResult {
    /// A link card: shortcuts, OPEN directives and navigation hits.
    Link {
        url: String,
        title: String,
        description: String,
    },
    /// An enriched person card.
    Person {
        name: String,
        description: String,
        url: Option<String>,
        image: Option<String>,
    },
    /// An enriched place card.
    Place {
        name: String,
        address: String,
        latitude: Option<f64>,
        longitude: Option<f64>,
        url: Option<String>,
        image: Option<String>,
    },
    /// An install suggestion; `website` is best-effort and may be null.
    Install {
        name: String,
        website: Option<String>,
        content: String,
    },
    /// A calculator result (or its evaluation error message).
    Calc { content: String },
    /// A diagnostic notice shown when the service is degraded.
    Status { content: String },
}

// ========================================
// Responses
// ========================================

/// `/ask` response. Errors are embedded in `answer` with a 200 status so
/// the launcher always has text to display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
}

/// `/action` response: ordered actions, the primary (first) action, and
/// the explicit error indicator for total pipeline failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResponse {
    pub actions: Vec<ActionResult>,
    pub action: Option<ActionResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionResponse {
    /// Wrap an ordered action list; index 0 becomes the primary action.
    pub fn from_actions(actions: Vec<ActionResult>, error: Option<String>) -> Self {
        let action = actions.first().cloned();
        Self {
            actions,
            action,
            error,
        }
    }
}

/// One semantic file search hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub name: String,
    pub path: String,
    pub score: f64,
    #[serde(rename = "type")]
    pub kind: String,
}

/// `/search` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchHit>,
}

// ========================================
// Install plans
// ========================================

/// Which backend produced the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallMethod {
    Apt,
    Flatpak,
    Failed,
}

/// An ordered command plan. The brain only plans; executing the commands
/// and elevating privilege is the caller's responsibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallPlan {
    pub method: InstallMethod,
    pub description: String,
    pub commands: Vec<String>,
}

impl InstallPlan {
    /// The explicit "nothing found" plan. Not an error.
    pub fn failed() -> Self {
        Self {
            method: InstallMethod::Failed,
            description: "Could not find package in apt or flatpak.".to_string(),
            commands: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_result_is_tagged_by_type() {
        let calc = ActionResult::Calc {
            content: "4".to_string(),
        };
        let json = serde_json::to_value(&calc).unwrap();
        assert_eq!(json["type"], "calc");
        assert_eq!(json["content"], "4");
    }

    #[test]
    fn person_serializes_null_image() {
        let person = ActionResult::Person {
            name: "Ada Lovelace".to_string(),
            description: "Mathematician".to_string(),
            url: Some("https://example.org/ada".to_string()),
            image: None,
        };
        let json = serde_json::to_value(&person).unwrap();
        assert_eq!(json["type"], "person");
        assert!(json["image"].is_null());
    }

    #[test]
    fn search_hit_renames_kind_to_type() {
        let hit = SearchHit {
            name: "notes.md".to_string(),
            path: "/home/user/notes.md".to_string(),
            score: 0.42,
            kind: "file".to_string(),
        };
        let json = serde_json::to_value(&hit).unwrap();
        assert_eq!(json["type"], "file");
    }

    #[test]
    fn install_method_is_lowercase_on_the_wire() {
        let plan = InstallPlan::failed();
        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["method"], "failed");
        assert!(json["commands"].as_array().unwrap().is_empty());
    }

    #[test]
    fn query_request_defaults_missing_query() {
        let req: QueryRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.query, "");
    }
}
