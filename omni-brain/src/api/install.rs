//! POST /install_plan, package location

use crate::error::{ApiError, ApiResult};
use crate::AppState;
use axum::extract::rejection::JsonRejection;
use axum::{extract::State, routing::post, Json, Router};
use omni_common::api::{InstallPlan, InstallPlanRequest};

pub async fn install_plan(
    State(state): State<AppState>,
    payload: Result<Json<InstallPlanRequest>, JsonRejection>,
) -> ApiResult<Json<InstallPlan>> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let app_name = request.app_name.trim();
    if app_name.is_empty() {
        // Unlike the query endpoints, the app name is required
        return Err(ApiError::BadRequest("No app name".to_string()));
    }

    let plan = state.planner.plan(app_name).await;
    Ok(Json(plan))
}

pub fn install_routes() -> Router<AppState> {
    Router::new().route("/install_plan", post(install_plan))
}
