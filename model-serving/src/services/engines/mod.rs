//! Inference engine abstractions and implementations.
//!
//! The service never looks inside a model: an engine turns a model
//! identifier into a [`ModelHandle`], and a handle turns a prompt into
//! candidate texts.

pub mod huggingface;
pub mod mock;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

pub use huggingface::{HuggingFaceConfig, HuggingFaceEngine};
pub use mock::MockEngine;

/// Error type for engine operations.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Model not found: {0}")]
    NotFound(String),

    #[error("Model {model_id} does not support text generation (pipeline: {pipeline})")]
    Unsupported { model_id: String, pipeline: String },

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Engine misconfigured: {0}")]
    Configuration(String),

    #[error("Model load aborted: {0}")]
    Aborted(String),
}

impl EngineError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::NotFound(_) => "not_found",
            EngineError::Unsupported { .. } => "unsupported",
            EngineError::ApiError(_) => "api",
            EngineError::NetworkError(_) => "network",
            EngineError::InvalidResponse(_) => "invalid_response",
            EngineError::Configuration(_) => "configuration",
            EngineError::Aborted(_) => "aborted",
        }
    }
}

/// Loads models by identifier.
#[async_trait]
pub trait InferenceEngine: Send + Sync {
    /// Short engine name for logs and metrics.
    fn name(&self) -> &'static str;

    /// Prepare `model_id` for generation.
    async fn load(&self, model_id: &str) -> Result<Arc<dyn ModelHandle>, EngineError>;
}

/// A loaded model.
#[async_trait]
pub trait ModelHandle: Send + Sync {
    /// Generate candidate continuations for `prompt`, best first.
    async fn generate(&self, prompt: &str) -> Result<Vec<String>, EngineError>;
}
