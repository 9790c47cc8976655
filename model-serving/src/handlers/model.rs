use crate::dtos::{DeployRequest, DeployResponse, ModelResponse, StatusResponse};
use crate::error::ServingError;
use crate::startup::AppState;
use axum::{extract::State, Json};

#[tracing::instrument(skip(state))]
pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: state.controller.status().await,
    })
}

#[tracing::instrument(skip(state))]
pub async fn get_model(State(state): State<AppState>) -> Json<ModelResponse> {
    Json(ModelResponse {
        model_id: state.controller.model_id().await,
    })
}

#[tracing::instrument(skip(state, request), fields(model_id = %request.model_id))]
pub async fn deploy_model(
    State(state): State<AppState>,
    Json(request): Json<DeployRequest>,
) -> Result<Json<DeployResponse>, ServingError> {
    tracing::info!(engine = state.controller.engine_name(), "Deployment requested");

    let model_id = state.controller.deploy(request.model_id).await?;

    Ok(Json(DeployResponse::Success { model_id }))
}
