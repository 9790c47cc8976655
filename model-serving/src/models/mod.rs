//! Domain models for the model-serving service.

pub mod deployment;

pub use deployment::{ActiveModel, Deployment, DeploymentState};
