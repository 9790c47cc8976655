//! Error kinds at the service boundary and their HTTP mapping.

use crate::dtos::{CompletionResponse, DeployResponse};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use service_core::error::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServingError {
    #[error("Model not deployed")]
    ModelNotDeployed,

    #[error("{0}")]
    DeployFailure(String),

    #[error("{0}")]
    GenerationFailure(String),

    #[error("A model deployment is already in progress")]
    DeployInProgress,

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ServingError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ServingError::ModelNotDeployed => "model_not_deployed",
            ServingError::DeployFailure(_) => "deploy_failure",
            ServingError::GenerationFailure(_) => "generation_failure",
            ServingError::DeployInProgress => "deploy_in_progress",
            ServingError::Validation(_) => "validation",
            ServingError::Internal(_) => "internal",
        }
    }
}

/// Deploy and generation failures keep the established contract: HTTP 200
/// with `{"status": "error", "message": ...}`. Only the not-deployed case is
/// signalled at the transport level (503).
impl IntoResponse for ServingError {
    fn into_response(self) -> Response {
        match self {
            ServingError::ModelNotDeployed => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "detail": "Model not deployed" })),
            )
                .into_response(),
            ServingError::DeployFailure(message) => {
                (StatusCode::OK, Json(DeployResponse::Error { message })).into_response()
            }
            ServingError::GenerationFailure(message) => {
                (StatusCode::OK, Json(CompletionResponse::Error { message })).into_response()
            }
            ServingError::DeployInProgress => {
                AppError::Conflict(anyhow::anyhow!("A model deployment is already in progress"))
                    .into_response()
            }
            ServingError::Validation(err) => AppError::ValidationError(err).into_response(),
            ServingError::Internal(err) => AppError::InternalError(err).into_response(),
        }
    }
}
