//! POST /search, semantic file search
//!
//! Returns `[]` whenever the store or the embedder is unavailable; the
//! endpoint never errors over a degraded index.

use crate::error::{ApiError, ApiResult};
use crate::AppState;
use axum::extract::rejection::JsonRejection;
use axum::{extract::State, routing::post, Json, Router};
use omni_common::api::{QueryRequest, SearchHit, SearchResponse};
use tracing::{debug, warn};

fn empty() -> Json<SearchResponse> {
    Json(SearchResponse {
        results: Vec::new(),
    })
}

pub async fn search(
    State(state): State<AppState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> ApiResult<Json<SearchResponse>> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let query = request.query.trim();
    if query.is_empty() {
        return Ok(empty());
    }

    state.registry.ensure_ready().await;

    let Some(store) = state.registry.store() else {
        return Ok(empty());
    };
    if !state.registry.embedder_ready() {
        return Ok(empty());
    }

    let vector = match state.embedder.embed(query).await {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "Query embedding failed");
            return Ok(empty());
        }
    };

    let hits = match store.search(&vector, state.config.search_limit) {
        Ok(hits) => hits,
        Err(e) => {
            warn!(error = %e, "Store search failed");
            return Ok(empty());
        }
    };

    // Hits at or beyond the distance cut-off are too far to be useful
    let results: Vec<SearchHit> = hits
        .into_iter()
        .filter(|hit| hit.distance < state.config.max_distance)
        .map(|hit| SearchHit {
            name: hit.name,
            path: hit.path,
            score: hit.distance,
            kind: "file".to_string(),
        })
        .collect();

    debug!(results = results.len(), "Semantic search answered");
    Ok(Json(SearchResponse { results }))
}

pub fn search_routes() -> Router<AppState> {
    Router::new().route("/search", post(search))
}
