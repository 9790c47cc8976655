//! Hugging Face engine.
//!
//! Resolves model identifiers against the Hub model API and generates text
//! through a text-generation inference endpoint that speaks the Inference
//! API wire format (`{"inputs": ...}` in, `[{"generated_text": ...}]` out).

use super::{EngineError, InferenceEngine, ModelHandle};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use service_core::observability::TracedRequestExt;
use std::sync::Arc;
use std::time::Duration;

/// Pipeline tag the Hub assigns to causal language models.
const TEXT_GENERATION_PIPELINE: &str = "text-generation";

/// Hugging Face engine configuration.
#[derive(Debug, Clone)]
pub struct HuggingFaceConfig {
    pub hub_url: String,
    pub inference_url: String,
    pub api_token: Option<Secret<String>>,
    pub timeout: Duration,
    pub max_new_tokens: Option<u32>,
}

pub struct HuggingFaceEngine {
    config: HuggingFaceConfig,
    hub_url: Url,
    inference_url: Url,
    client: Client,
}

impl HuggingFaceEngine {
    pub fn new(config: HuggingFaceConfig) -> Result<Self, EngineError> {
        let hub_url = parse_base(&config.hub_url)?;
        let inference_url = parse_base(&config.inference_url)?;

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| EngineError::NetworkError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            hub_url,
            inference_url,
            client,
        })
    }
}

fn parse_base(raw: &str) -> Result<Url, EngineError> {
    let url = Url::parse(raw)
        .map_err(|e| EngineError::Configuration(format!("Invalid base URL {}: {}", raw, e)))?;
    if url.cannot_be_a_base() {
        return Err(EngineError::Configuration(format!(
            "{} cannot be used as a base URL",
            raw
        )));
    }
    Ok(url)
}

/// Hub ids are `name` or `namespace/name`, each part `[A-Za-z0-9._-]`.
fn is_valid_model_id(model_id: &str) -> bool {
    let parts: Vec<&str> = model_id.split('/').collect();
    parts.len() <= 2
        && parts.iter().all(|part| {
            !part.is_empty()
                && *part != "."
                && *part != ".."
                && part
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        })
}

/// `base` + `prefix` + the id's parts, each pushed as an encoded segment.
fn endpoint(base: &Url, prefix: &[&str], model_id: &str) -> Url {
    let mut url = base.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments
            .pop_if_empty()
            .extend(prefix)
            .extend(model_id.split('/'));
    }
    url
}

fn authorize(request: RequestBuilder, token: Option<&Secret<String>>) -> RequestBuilder {
    match token {
        Some(token) => request.bearer_auth(token.expose_secret()),
        None => request,
    }
}

#[async_trait]
impl InferenceEngine for HuggingFaceEngine {
    fn name(&self) -> &'static str {
        "huggingface"
    }

    async fn load(&self, model_id: &str) -> Result<Arc<dyn ModelHandle>, EngineError> {
        if !is_valid_model_id(model_id) {
            return Err(EngineError::NotFound(format!(
                "{:?} is not a valid model identifier",
                model_id
            )));
        }

        tracing::debug!(model_id = %model_id, "Resolving model on the hub");

        let request = self
            .client
            .get(endpoint(&self.hub_url, &["api", "models"], model_id))
            .with_trace_context();
        let response = authorize(request, self.config.api_token.as_ref())
            .send()
            .await
            .map_err(|e| EngineError::NetworkError(e.to_string()))?;

        match response.status() {
            status if status.is_success() => {}
            // The hub answers 401 for repositories that do not exist when
            // the caller is anonymous.
            StatusCode::NOT_FOUND | StatusCode::UNAUTHORIZED => {
                return Err(EngineError::NotFound(format!(
                    "{} is not a valid model identifier on the hub",
                    model_id
                )));
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                return Err(EngineError::ApiError(format!(
                    "Hub API error {}: {}",
                    status, body
                )));
            }
        }

        let info: ModelInfo = response
            .json()
            .await
            .map_err(|e| EngineError::InvalidResponse(format!("Failed to parse model info: {}", e)))?;

        if let Some(pipeline) = info.pipeline_tag {
            if pipeline != TEXT_GENERATION_PIPELINE {
                return Err(EngineError::Unsupported {
                    model_id: model_id.to_string(),
                    pipeline,
                });
            }
        }

        Ok(Arc::new(HuggingFaceModel {
            client: self.client.clone(),
            url: endpoint(&self.inference_url, &["models"], model_id),
            api_token: self.config.api_token.clone(),
            parameters: GenerationParameters {
                max_new_tokens: self.config.max_new_tokens,
                return_full_text: true,
            },
        }))
    }
}

/// A model served by the inference endpoint.
struct HuggingFaceModel {
    client: Client,
    url: Url,
    api_token: Option<Secret<String>>,
    parameters: GenerationParameters,
}

#[async_trait]
impl ModelHandle for HuggingFaceModel {
    async fn generate(&self, prompt: &str) -> Result<Vec<String>, EngineError> {
        let body = GenerateRequest {
            inputs: prompt,
            parameters: &self.parameters,
            options: RequestOptions {
                wait_for_model: true,
            },
        };

        tracing::debug!(url = %self.url, prompt_len = prompt.len(), "Sending generation request");

        let request = self.client.post(self.url.clone()).json(&body).with_trace_context();
        let response = authorize(request, self.api_token.as_ref())
            .send()
            .await
            .map_err(|e| EngineError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&error_text)
                .map(|e| e.error)
                .unwrap_or(error_text);

            return Err(EngineError::ApiError(format!(
                "Inference API error {}: {}",
                status, message
            )));
        }

        let candidates: Vec<GeneratedText> = response
            .json()
            .await
            .map_err(|e| EngineError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        Ok(candidates.into_iter().map(|c| c.generated_text).collect())
    }
}

// Hub / Inference API types

#[derive(Debug, Deserialize)]
struct ModelInfo {
    #[serde(default)]
    pipeline_tag: Option<String>,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    inputs: &'a str,
    parameters: &'a GenerationParameters,
    options: RequestOptions,
}

#[derive(Debug, Clone, Serialize)]
struct GenerationParameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    max_new_tokens: Option<u32>,
    return_full_text: bool,
}

#[derive(Debug, Serialize)]
struct RequestOptions {
    wait_for_model: bool,
}

#[derive(Debug, Deserialize)]
struct GeneratedText {
    generated_text: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: String,
}
