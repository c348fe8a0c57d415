//! Metrics scrape handler

use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
};

use crate::{AppError, AppResult, AppState};

pub async fn render(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let body = state
        .metrics
        .render()
        .map_err(|e| AppError::InternalError(format!("failed to encode metrics: {}", e)))?;

    Ok(([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], body))
}
