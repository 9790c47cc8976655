use crate::dtos::{CompletionRequest, CompletionResponse};
use crate::error::ServingError;
use crate::startup::AppState;
use axum::{extract::State, Json};

#[tracing::instrument(skip(state, request), fields(messages = request.messages.len()))]
pub async fn create_completion(
    State(state): State<AppState>,
    Json(request): Json<CompletionRequest>,
) -> Result<Json<CompletionResponse>, ServingError> {
    let response = state.invoker.complete(&request).await?;
    Ok(Json(response))
}
