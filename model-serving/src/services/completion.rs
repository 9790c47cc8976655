//! Completion invoker: one prompt in, one assistant reply out.

use crate::dtos::{CompletionRequest, CompletionResponse, Reply};
use crate::error::ServingError;
use crate::services::deployment::DeploymentController;
use crate::services::metrics;
use std::time::Instant;
use validator::Validate;

#[derive(Clone)]
pub struct CompletionInvoker {
    controller: DeploymentController,
}

impl CompletionInvoker {
    pub fn new(controller: DeploymentController) -> Self {
        Self { controller }
    }

    /// Run a single-turn completion against the serving model.
    ///
    /// Fails with [`ServingError::ModelNotDeployed`] unless a model is
    /// `RUNNING`, whatever the request holds. The handle is cloned out of
    /// the slot first, so generation never holds the deployment lock.
    pub async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, ServingError> {
        let result = self.generate_reply(request).await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(e) => e.kind(),
        };
        metrics::record_completion(outcome);

        result.map(|reply| CompletionResponse::Success {
            response: vec![reply],
        })
    }

    async fn generate_reply(&self, request: &CompletionRequest) -> Result<Reply, ServingError> {
        let active = self
            .controller
            .active_model()
            .await
            .ok_or(ServingError::ModelNotDeployed)?;

        request.validate()?;
        let prompt = request.prompt().unwrap_or_default();

        let started = Instant::now();
        let candidates = active.handle.generate(prompt).await.map_err(|e| {
            tracing::warn!(
                model_id = %active.model_id,
                error = %e,
                error_kind = e.kind(),
                "Generation failed"
            );
            ServingError::GenerationFailure(e.to_string())
        })?;
        metrics::record_generation_latency(&active.model_id, started.elapsed().as_secs_f64());

        let text = candidates.into_iter().next().ok_or_else(|| {
            ServingError::GenerationFailure(format!(
                "{} returned no generated text",
                active.model_id
            ))
        })?;

        tracing::info!(
            model_id = %active.model_id,
            prompt_len = prompt.len(),
            reply_len = text.len(),
            "Completion generated"
        );

        Ok(Reply::assistant(text))
    }
}
