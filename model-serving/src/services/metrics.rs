//! Deployment and completion metrics.
//!
//! Recorded through the `metrics` facade; rendered by the recorder that
//! `service_core::metrics::init_metrics` installs.

use crate::models::DeploymentState;
use metrics::{counter, gauge, histogram};

/// Record the current deployment state as a numeric gauge.
pub fn record_state(state: DeploymentState) {
    gauge!("model_deployment_state").set(state.gauge_value());
}

/// Record a finished deploy attempt.
pub fn record_deployment(engine: &'static str, outcome: &'static str, duration_secs: f64) {
    counter!("model_deployments_total", "engine" => engine, "outcome" => outcome).increment(1);
    histogram!("model_load_duration_seconds", "engine" => engine).record(duration_secs);
}

/// Record a finished completion request.
pub fn record_completion(outcome: &'static str) {
    counter!("completions_total", "outcome" => outcome).increment(1);
}

/// Record inference latency for the served model.
pub fn record_generation_latency(model_id: &str, duration_secs: f64) {
    histogram!("generation_duration_seconds", "model" => model_id.to_string())
        .record(duration_secs);
}
