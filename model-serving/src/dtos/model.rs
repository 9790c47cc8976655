use crate::models::DeploymentState;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: DeploymentState,
}

/// `model_id` serialises as `null` when nothing is deployed.
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelResponse {
    pub model_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeployRequest {
    pub model_id: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DeployResponse {
    Success { model_id: String },
    Error { message: String },
}
