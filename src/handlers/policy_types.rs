//! Policy type handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{AppResult, AppState};
use crate::metrics::CREATE_POLICY_TYPE_REQS;
use crate::models::{PolicyTypeId, PolicyTypeSchema, PolicyTypeStatus};

/// List all policy type ids
///
/// Always answers 200: a backend failure is logged and reported as an empty list.
pub async fn list(State(state): State<AppState>) -> Json<Vec<PolicyTypeId>> {
    match state.store.list_policy_type_ids().await {
        Ok(ids) => Json(ids),
        Err(e) => {
            tracing::error!("Error retrieving policy types: {}", e);
            Json(Vec::new())
        }
    }
}

/// Get single policy type
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<PolicyTypeId>,
) -> AppResult<Json<PolicyTypeSchema>> {
    let schema = state.store.get_policy_type(id).await?;
    Ok(Json(schema))
}

/// Create policy type
pub async fn create(
    State(state): State<AppState>,
    Path(id): Path<PolicyTypeId>,
    Json(req): Json<PolicyTypeSchema>,
) -> AppResult<StatusCode> {
    state.metrics.inc(CREATE_POLICY_TYPE_REQS);
    state.store.create_policy_type(id, &req).await?;
    tracing::info!("Policy type {} created ({})", id, req.name);
    Ok(StatusCode::CREATED)
}

/// Policy type status
pub async fn status(
    State(state): State<AppState>,
    Path(id): Path<PolicyTypeId>,
) -> AppResult<Json<PolicyTypeStatus>> {
    let status = state.store.get_policy_type_status(id).await?;
    Ok(Json(status))
}
