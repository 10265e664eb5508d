//! POST /action, the fast intent path

use crate::error::{ApiError, ApiResult};
use crate::registry::ResourceState;
use crate::AppState;
use axum::extract::rejection::JsonRejection;
use axum::{extract::State, routing::post, Json, Router};
use omni_common::api::{ActionResponse, ActionResult, QueryRequest};
use tracing::info;

pub async fn action(
    State(state): State<AppState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> ApiResult<Json<ActionResponse>> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let query = request.query.trim();
    if query.is_empty() {
        return Ok(Json(ActionResponse::from_actions(Vec::new(), None)));
    }

    // Lazy load; a failed model degrades to a status card instead of
    // aborting the request
    if let ResourceState::Failed(reason) = state.registry.ensure_ready().await {
        let card = ActionResult::Status {
            content: format!("The Omni AI hasn't loaded: {}", reason),
        };
        return Ok(Json(ActionResponse::from_actions(
            vec![card],
            Some(reason),
        )));
    }

    info!(query = %query, "Fast request");
    let outcome = state.pipeline.run(query).await;
    Ok(Json(ActionResponse::from_actions(
        outcome.actions,
        outcome.error,
    )))
}

pub fn action_routes() -> Router<AppState> {
    Router::new().route("/action", post(action))
}
