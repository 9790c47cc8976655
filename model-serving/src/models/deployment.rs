use crate::services::engines::ModelHandle;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Lifecycle phase of the managed model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeploymentState {
    NotDeployed,
    Pending,
    Deploying,
    Running,
}

impl DeploymentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentState::NotDeployed => "NOT_DEPLOYED",
            DeploymentState::Pending => "PENDING",
            DeploymentState::Deploying => "DEPLOYING",
            DeploymentState::Running => "RUNNING",
        }
    }

    /// Numeric code exported on the `model_deployment_state` gauge.
    pub fn gauge_value(&self) -> f64 {
        match self {
            DeploymentState::NotDeployed => 0.0,
            DeploymentState::Pending => 1.0,
            DeploymentState::Deploying => 2.0,
            DeploymentState::Running => 3.0,
        }
    }
}

impl fmt::Display for DeploymentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A loaded model ready to serve completions.
#[derive(Clone)]
pub struct ActiveModel {
    pub model_id: String,
    pub handle: Arc<dyn ModelHandle>,
}

impl fmt::Debug for ActiveModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveModel")
            .field("model_id", &self.model_id)
            .finish_non_exhaustive()
    }
}

/// The deployment slot. A handle exists only in `Running`.
#[derive(Debug, Clone, Default)]
pub enum Deployment {
    #[default]
    NotDeployed,
    Pending {
        model_id: String,
    },
    Deploying {
        model_id: String,
    },
    Running(ActiveModel),
}

impl Deployment {
    pub fn state(&self) -> DeploymentState {
        match self {
            Deployment::NotDeployed => DeploymentState::NotDeployed,
            Deployment::Pending { .. } => DeploymentState::Pending,
            Deployment::Deploying { .. } => DeploymentState::Deploying,
            Deployment::Running(_) => DeploymentState::Running,
        }
    }

    /// Model id being deployed or served.
    pub fn target_model_id(&self) -> Option<&str> {
        match self {
            Deployment::NotDeployed => None,
            Deployment::Pending { model_id } | Deployment::Deploying { model_id } => {
                Some(model_id.as_str())
            }
            Deployment::Running(active) => Some(active.model_id.as_str()),
        }
    }

    /// The serving model, if any.
    pub fn active(&self) -> Option<&ActiveModel> {
        match self {
            Deployment::Running(active) => Some(active),
            _ => None,
        }
    }
}
