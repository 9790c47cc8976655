//! In-process engine for local development and tests.

use super::{EngineError, InferenceEngine, ModelHandle};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// Model ids the mock engine knows by default.
const DEFAULT_MODELS: &[&str] = &["gpt2", "distilgpt2", "sshleifer/tiny-gpt2"];

/// Mock engine with a fixed model catalogue.
pub struct MockEngine {
    models: HashSet<String>,
    failing_models: HashSet<String>,
    load_delay: Duration,
}

impl MockEngine {
    pub fn new() -> Self {
        Self {
            models: DEFAULT_MODELS.iter().map(|m| m.to_string()).collect(),
            failing_models: HashSet::new(),
            load_delay: Duration::ZERO,
        }
    }

    /// Register an extra model id.
    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.models.insert(model_id.into());
        self
    }

    /// Register a model that loads but fails every generation.
    pub fn with_failing_model(mut self, model_id: impl Into<String>) -> Self {
        let model_id = model_id.into();
        self.models.insert(model_id.clone());
        self.failing_models.insert(model_id);
        self
    }

    /// Simulate slow weight loading.
    pub fn with_load_delay(mut self, delay: Duration) -> Self {
        self.load_delay = delay;
        self
    }
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InferenceEngine for MockEngine {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn load(&self, model_id: &str) -> Result<Arc<dyn ModelHandle>, EngineError> {
        if !self.load_delay.is_zero() {
            tokio::time::sleep(self.load_delay).await;
        }

        if !self.models.contains(model_id) {
            return Err(EngineError::NotFound(format!(
                "{} is not a known model identifier",
                model_id
            )));
        }

        Ok(Arc::new(MockModel {
            model_id: model_id.to_string(),
            fail: self.failing_models.contains(model_id),
        }))
    }
}

struct MockModel {
    model_id: String,
    fail: bool,
}

#[async_trait]
impl ModelHandle for MockModel {
    async fn generate(&self, prompt: &str) -> Result<Vec<String>, EngineError> {
        if self.fail {
            return Err(EngineError::ApiError(format!(
                "{} failed to generate",
                self.model_id
            )));
        }

        Ok(vec![format!("{} [{}]: mock continuation", prompt, self.model_id)])
    }
}
