#![allow(dead_code)]

use model_serving::config::{DeploymentConfig, EngineBackend, EngineConfig, ServingConfig};
use model_serving::services::engines::{InferenceEngine, MockEngine};
use model_serving::services::DeploymentController;
use model_serving::startup::Application;
use reqwest::Client;
use serde_json::{json, Value};
use service_core::config::Config as CoreConfig;
use service_core::metrics::init_metrics;
use std::sync::{Arc, Once};
use std::time::Duration;

static INIT_METRICS: Once = Once::new();

/// Model id the broken test model is registered under.
pub const FAILING_MODEL: &str = "broken-model";

pub fn test_config() -> ServingConfig {
    ServingConfig {
        common: CoreConfig {
            port: 0, // Random port for testing
            ..CoreConfig::default()
        },
        engine: EngineConfig {
            backend: EngineBackend::Mock,
            hub_url: "http://127.0.0.1:9".to_string(),
            inference_url: "http://127.0.0.1:9".to_string(),
            api_token: None,
            timeout_secs: 5,
            max_new_tokens: None,
        },
        deployment: DeploymentConfig {
            provisioning_delay_ms: 0,
        },
        otlp_endpoint: None,
    }
}

pub struct TestApp {
    pub address: String,
    pub controller: DeploymentController,
    pub client: Client,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_engine(Arc::new(
            MockEngine::new().with_failing_model(FAILING_MODEL),
        ))
        .await
    }

    pub async fn spawn_with_engine(engine: Arc<dyn InferenceEngine>) -> Self {
        INIT_METRICS.call_once(init_metrics);

        let app = Application::build_with_engine(test_config(), engine)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let controller = app.controller().clone();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to be ready by polling the health endpoint
        let client = Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        TestApp {
            address,
            controller,
            client,
        }
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.address, path))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(format!("{}{}", self.address, path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn deploy(&self, model_id: &str) -> reqwest::Response {
        self.post_json("/model", &json!({ "model_id": model_id })).await
    }

    pub async fn complete(&self, content: &str) -> reqwest::Response {
        self.post_json(
            "/completion",
            &json!({ "messages": [{ "role": "user", "content": content }] }),
        )
        .await
    }

    pub async fn status(&self) -> String {
        let body: Value = self.get("/status").await.json().await.unwrap();
        body["status"].as_str().unwrap().to_string()
    }
}
