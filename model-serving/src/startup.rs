//! Application startup and lifecycle management.

use crate::config::{EngineBackend, ServingConfig};
use crate::handlers;
use crate::services::engines::{HuggingFaceConfig, HuggingFaceEngine, InferenceEngine, MockEngine};
use crate::services::{CompletionInvoker, DeploymentController};
use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{metrics_middleware, request_id_middleware, REQUEST_ID_HEADER};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ServingConfig,
    pub controller: DeploymentController,
    pub invoker: CompletionInvoker,
}

impl AppState {
    pub fn new(config: ServingConfig, engine: Arc<dyn InferenceEngine>) -> Self {
        let controller =
            DeploymentController::new(engine, config.deployment.provisioning_delay());
        let invoker = CompletionInvoker::new(controller.clone());

        Self {
            config,
            controller,
            invoker,
        }
    }
}

/// Construct the engine selected by configuration.
pub fn build_engine(config: &ServingConfig) -> Result<Arc<dyn InferenceEngine>, AppError> {
    let engine: Arc<dyn InferenceEngine> = match config.engine.backend {
        EngineBackend::HuggingFace => {
            let engine = HuggingFaceEngine::new(HuggingFaceConfig {
                hub_url: config.engine.hub_url.clone(),
                inference_url: config.engine.inference_url.clone(),
                api_token: config.engine.api_token.clone(),
                timeout: config.engine.timeout(),
                max_new_tokens: config.engine.max_new_tokens,
            })
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!(e)))?;
            Arc::new(engine)
        }
        EngineBackend::Mock => Arc::new(MockEngine::new()),
    };

    tracing::info!(engine = engine.name(), "Initialized inference engine");

    Ok(engine)
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route("/status", get(handlers::get_status))
        .route("/model", get(handlers::get_model).post(handlers::deploy_model))
        .route("/completion", post(handlers::create_completion))
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the engine selected by configuration.
    pub async fn build(config: ServingConfig) -> Result<Self, AppError> {
        let engine = build_engine(&config)?;
        Self::build_with_engine(config, engine).await
    }

    /// Build the application around an explicit engine.
    pub async fn build_with_engine(
        config: ServingConfig,
        engine: Arc<dyn InferenceEngine>,
    ) -> Result<Self, AppError> {
        let state = AppState::new(config.clone(), engine);

        // Port 0 binds a random port (tests).
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Model serving listening on port {}", port);

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn controller(&self) -> &DeploymentController {
        &self.state.controller
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.run_with_shutdown(std::future::pending()).await
    }

    /// Serve until `shutdown` resolves, then drain in-flight requests.
    pub async fn run_with_shutdown<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = build_router(self.state);
        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown)
            .await
    }
}
