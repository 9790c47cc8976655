use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::time::Duration;

/// Default pause between PENDING and DEPLOYING.
const DEFAULT_PROVISIONING_DELAY_MS: u64 = 1_000;

/// Default HTTP timeout for inference backend calls.
const DEFAULT_ENGINE_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone)]
pub struct ServingConfig {
    pub common: core_config::Config,
    pub engine: EngineConfig,
    pub deployment: DeploymentConfig,
    /// OTLP collector endpoint; span export is disabled when unset.
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub backend: EngineBackend,
    /// Model hub used to resolve model identifiers (e.g. https://huggingface.co).
    pub hub_url: String,
    /// Text-generation inference endpoint base.
    pub inference_url: String,
    /// Bearer token for the hub and inference endpoint.
    pub api_token: Option<secrecy::Secret<String>>,
    pub timeout_secs: u64,
    pub max_new_tokens: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct DeploymentConfig {
    /// Simulated provisioning pause in milliseconds; 0 disables it.
    pub provisioning_delay_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineBackend {
    HuggingFace,
    Mock,
}

impl ServingConfig {
    pub fn load() -> Result<Self, AppError> {
        // Loads .env and APP__-prefixed settings (port, log level).
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        Ok(ServingConfig {
            common: common_config,
            engine: EngineConfig {
                backend: get_env("ENGINE_BACKEND", Some("huggingface"), is_prod)?
                    .parse()
                    .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?,
                hub_url: get_env("HF_HUB_URL", Some("https://huggingface.co"), is_prod)?,
                inference_url: get_env(
                    "HF_INFERENCE_URL",
                    Some("https://api-inference.huggingface.co"),
                    is_prod,
                )?,
                api_token: env::var("HF_API_TOKEN")
                    .ok()
                    .filter(|t| !t.is_empty())
                    .map(secrecy::Secret::new),
                timeout_secs: parse_env(
                    "ENGINE_TIMEOUT_SECS",
                    DEFAULT_ENGINE_TIMEOUT_SECS,
                    is_prod,
                )?,
                max_new_tokens: env::var("GENERATION_MAX_NEW_TOKENS")
                    .ok()
                    .map(|v| {
                        v.parse().map_err(|e| {
                            AppError::ConfigError(anyhow::anyhow!(
                                "GENERATION_MAX_NEW_TOKENS must be a positive integer: {}",
                                e
                            ))
                        })
                    })
                    .transpose()?,
            },
            deployment: DeploymentConfig {
                provisioning_delay_ms: parse_env(
                    "DEPLOY_PROVISIONING_DELAY_MS",
                    DEFAULT_PROVISIONING_DELAY_MS,
                    is_prod,
                )?,
            },
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|e| !e.is_empty()),
        })
    }
}

impl EngineConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl DeploymentConfig {
    pub fn provisioning_delay(&self) -> Duration {
        Duration::from_millis(self.provisioning_delay_ms)
    }
}

impl std::str::FromStr for EngineBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "huggingface" | "hf" => Ok(EngineBackend::HuggingFace),
            "mock" => Ok(EngineBackend::Mock),
            _ => Err(format!("Invalid engine backend: {}", s)),
        }
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

fn parse_env(key: &str, default: u64, is_prod: bool) -> Result<u64, AppError> {
    get_env(key, Some(&default.to_string()), is_prod)?
        .parse()
        .map_err(|e| AppError::ConfigError(anyhow::anyhow!("{} must be an integer: {}", key, e)))
}
