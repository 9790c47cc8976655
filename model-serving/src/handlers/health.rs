use crate::models::DeploymentState;
use crate::startup::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use service_core::error::AppError;

/// Liveness probe.
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "model-serving",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Readiness probe: ready only while a model is serving.
pub async fn readiness_check(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    match state.controller.status().await {
        DeploymentState::Running => Ok(StatusCode::OK),
        _ => Err(AppError::ServiceUnavailable),
    }
}
