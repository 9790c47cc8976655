//! HTTP handlers for the model-serving service.

pub mod completion;
pub mod health;
pub mod metrics;
pub mod model;

pub use completion::create_completion;
pub use health::{health_check, readiness_check};
pub use self::metrics::metrics_endpoint;
pub use model::{deploy_model, get_model, get_status};
