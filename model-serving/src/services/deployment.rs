//! Deployment controller.
//!
//! Owns the single deployment slot and drives it through
//! `NOT_DEPLOYED -> PENDING -> DEPLOYING -> RUNNING`. Any load failure puts
//! the slot back to `NOT_DEPLOYED`. The slot is one tagged value behind one
//! lock, so readers never see a torn (state, model, handle) triple; they
//! may see any intermediate state of an in-flight deploy.

use crate::error::ServingError;
use crate::models::{ActiveModel, Deployment, DeploymentState};
use crate::services::engines::{EngineError, InferenceEngine, ModelHandle};
use crate::services::metrics;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};

#[derive(Clone)]
pub struct DeploymentController {
    inner: Arc<Inner>,
}

struct Inner {
    engine: Arc<dyn InferenceEngine>,
    deployment: RwLock<Deployment>,
    /// Held for the whole of one deploy attempt.
    deploy_guard: Arc<Mutex<()>>,
    provisioning_delay: Duration,
}

impl DeploymentController {
    pub fn new(engine: Arc<dyn InferenceEngine>, provisioning_delay: Duration) -> Self {
        metrics::record_state(DeploymentState::NotDeployed);

        Self {
            inner: Arc::new(Inner {
                engine,
                deployment: RwLock::new(Deployment::NotDeployed),
                deploy_guard: Arc::new(Mutex::new(())),
                provisioning_delay,
            }),
        }
    }

    pub fn engine_name(&self) -> &'static str {
        self.inner.engine.name()
    }

    pub async fn status(&self) -> DeploymentState {
        self.inner.deployment.read().await.state()
    }

    /// Id of the serving model; `None` unless `RUNNING`.
    pub async fn model_id(&self) -> Option<String> {
        self.inner
            .deployment
            .read()
            .await
            .active()
            .map(|active| active.model_id.clone())
    }

    /// Snapshot of the serving model for one completion.
    pub async fn active_model(&self) -> Option<ActiveModel> {
        self.inner.deployment.read().await.active().cloned()
    }

    /// Deploy `model_id`, replacing whatever is currently served.
    ///
    /// Only one attempt may be in flight; a concurrent call fails with
    /// [`ServingError::DeployInProgress`] without touching the slot. The
    /// attempt runs on its own task, so dropping the returned future (e.g.
    /// the HTTP client hanging up) does not leave the slot half-way.
    pub async fn deploy(&self, model_id: String) -> Result<String, ServingError> {
        let guard = self
            .inner
            .deploy_guard
            .clone()
            .try_lock_owned()
            .map_err(|_| ServingError::DeployInProgress)?;

        let inner = self.inner.clone();
        let attempt = tokio::spawn(async move {
            let result = inner.run_deploy(model_id).await;
            drop(guard);
            result
        });

        attempt
            .await
            .map_err(|e| ServingError::Internal(anyhow::anyhow!("Deployment task failed: {}", e)))?
    }
}

impl Inner {
    async fn run_deploy(&self, model_id: String) -> Result<String, ServingError> {
        let engine = self.engine.name();

        // The previous model stays alive until the new load resolves.
        let retired = self
            .transition(Deployment::Pending {
                model_id: model_id.clone(),
            })
            .await;

        if !self.provisioning_delay.is_zero() {
            tokio::time::sleep(self.provisioning_delay).await;
        }

        self.transition(Deployment::Deploying {
            model_id: model_id.clone(),
        })
        .await;

        let started = Instant::now();
        let loaded = self.load_isolated(&model_id).await;
        let elapsed = started.elapsed().as_secs_f64();

        let result = match loaded {
            Ok(handle) => {
                self.transition(Deployment::Running(ActiveModel {
                    model_id: model_id.clone(),
                    handle,
                }))
                .await;

                tracing::info!(
                    model_id = %model_id,
                    engine = engine,
                    duration_secs = elapsed,
                    "Model deployed"
                );
                metrics::record_deployment(engine, "success", elapsed);
                Ok(model_id)
            }
            Err(e) => {
                self.transition(Deployment::NotDeployed).await;

                tracing::warn!(
                    model_id = %model_id,
                    engine = engine,
                    error = %e,
                    error_kind = e.kind(),
                    "Model deployment failed"
                );
                metrics::record_deployment(engine, "failure", elapsed);
                Err(ServingError::DeployFailure(e.to_string()))
            }
        };

        drop(retired);
        result
    }

    /// Run the engine load on its own task so a panicking engine surfaces
    /// as a failed load instead of unwinding through the attempt.
    async fn load_isolated(&self, model_id: &str) -> Result<Arc<dyn ModelHandle>, EngineError> {
        let engine = self.engine.clone();
        let model_id = model_id.to_string();

        tokio::spawn(async move { engine.load(&model_id).await })
            .await
            .map_err(|e| EngineError::Aborted(e.to_string()))?
    }

    /// Swap the slot and return what it held.
    async fn transition(&self, next: Deployment) -> Deployment {
        let to = next.state();
        let target = next.target_model_id().unwrap_or("-").to_string();

        let mut slot = self.deployment.write().await;
        let from = slot.state();
        let previous = std::mem::replace(&mut *slot, next);
        drop(slot);

        tracing::debug!(
            from = %from,
            to = %to,
            model_id = %target,
            previous_model_id = previous.target_model_id().unwrap_or("-"),
            "Deployment state changed"
        );
        metrics::record_state(to);

        previous
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::engines::MockEngine;
    use async_trait::async_trait;

    struct PanickingEngine;

    #[async_trait]
    impl InferenceEngine for PanickingEngine {
        fn name(&self) -> &'static str {
            "panicking"
        }

        async fn load(&self, _model_id: &str) -> Result<Arc<dyn ModelHandle>, EngineError> {
            panic!("engine bug");
        }
    }

    fn controller(engine: MockEngine) -> DeploymentController {
        DeploymentController::new(Arc::new(engine), Duration::ZERO)
    }

    #[tokio::test]
    async fn starts_not_deployed() {
        let controller = controller(MockEngine::new());

        assert_eq!(controller.status().await, DeploymentState::NotDeployed);
        assert_eq!(controller.model_id().await, None);
        assert!(controller.active_model().await.is_none());
    }

    #[tokio::test]
    async fn reads_are_idempotent() {
        let controller = controller(MockEngine::new());

        for _ in 0..3 {
            assert_eq!(controller.status().await, DeploymentState::NotDeployed);
            assert_eq!(controller.model_id().await, None);
        }
    }

    #[tokio::test]
    async fn successful_deploy_runs_model() {
        let controller = controller(MockEngine::new());

        let deployed = controller.deploy("gpt2".to_string()).await.unwrap();

        assert_eq!(deployed, "gpt2");
        assert_eq!(controller.status().await, DeploymentState::Running);
        assert_eq!(controller.model_id().await.as_deref(), Some("gpt2"));
        assert!(controller.active_model().await.is_some());
    }

    #[tokio::test]
    async fn failed_deploy_resets_to_not_deployed() {
        let controller = controller(MockEngine::new());

        let err = controller
            .deploy("invalid_model_name".to_string())
            .await
            .unwrap_err();

        assert!(matches!(err, ServingError::DeployFailure(ref m) if !m.is_empty()));
        assert_eq!(controller.status().await, DeploymentState::NotDeployed);
        assert_eq!(controller.model_id().await, None);
    }

    #[tokio::test]
    async fn failed_redeploy_discards_previous_model() {
        let controller = controller(MockEngine::new());
        controller.deploy("gpt2".to_string()).await.unwrap();

        assert!(controller.deploy("nope".to_string()).await.is_err());

        assert_eq!(controller.status().await, DeploymentState::NotDeployed);
        assert!(controller.active_model().await.is_none());
    }

    #[tokio::test]
    async fn redeploy_replaces_model() {
        let controller = controller(MockEngine::new());
        controller.deploy("gpt2".to_string()).await.unwrap();
        controller.deploy("distilgpt2".to_string()).await.unwrap();

        assert_eq!(controller.model_id().await.as_deref(), Some("distilgpt2"));
    }

    #[tokio::test]
    async fn intermediate_states_are_observable() {
        let controller = DeploymentController::new(
            Arc::new(MockEngine::new().with_load_delay(Duration::from_millis(300))),
            Duration::from_millis(100),
        );

        let deploying = controller.clone();
        let attempt = tokio::spawn(async move { deploying.deploy("gpt2".to_string()).await });

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(controller.status().await, DeploymentState::Pending);
        assert_eq!(controller.model_id().await, None);

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(controller.status().await, DeploymentState::Deploying);

        attempt.await.unwrap().unwrap();
        assert_eq!(controller.status().await, DeploymentState::Running);
    }

    #[tokio::test]
    async fn concurrent_deploy_is_rejected() {
        let controller = DeploymentController::new(
            Arc::new(MockEngine::new().with_load_delay(Duration::from_millis(200))),
            Duration::ZERO,
        );

        let first = controller.clone();
        let attempt = tokio::spawn(async move { first.deploy("gpt2".to_string()).await });
        tokio::time::sleep(Duration::from_millis(50)).await;

        let second = controller.deploy("distilgpt2".to_string()).await;
        assert!(matches!(second, Err(ServingError::DeployInProgress)));

        assert_eq!(attempt.await.unwrap().unwrap(), "gpt2");
        assert_eq!(controller.model_id().await.as_deref(), Some("gpt2"));
    }

    #[tokio::test]
    async fn abandoned_deploy_still_completes() {
        let controller = DeploymentController::new(
            Arc::new(MockEngine::new().with_load_delay(Duration::from_millis(100))),
            Duration::ZERO,
        );

        let abandoned = tokio::time::timeout(
            Duration::from_millis(20),
            controller.deploy("gpt2".to_string()),
        )
        .await;
        assert!(abandoned.is_err());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(controller.status().await, DeploymentState::Running);
    }

    #[tokio::test]
    async fn panicking_engine_resets_to_not_deployed() {
        let controller = DeploymentController::new(Arc::new(PanickingEngine), Duration::ZERO);

        let err = controller.deploy("gpt2".to_string()).await.unwrap_err();

        assert!(matches!(err, ServingError::DeployFailure(ref m) if m.contains("aborted")));
        assert_eq!(controller.status().await, DeploymentState::NotDeployed);
        assert!(controller.active_model().await.is_none());

        // The deploy slot is free again.
        let again = controller.deploy("gpt2".to_string()).await.unwrap_err();
        assert!(matches!(again, ServingError::DeployFailure(_)));
    }
}
