//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::{AppError, AppResult, AppState};

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    environment: String,
    timestamp: i64,
}

/// Healthy only while the backend answers
pub async fn check(State(state): State<AppState>) -> AppResult<Json<HealthResponse>> {
    state.store.healthcheck().await.map_err(|e| {
        tracing::error!("A1 is not healthy, backend unreachable: {}", e);
        AppError::InternalError(format!("backend connection is unhealthy: {}", e))
    })?;

    Ok(Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.environment.clone(),
        timestamp: chrono::Utc::now().timestamp(),
    }))
}
