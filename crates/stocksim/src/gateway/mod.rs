//! Access to the remote simulation service.
//!
//! [`SimulationGateway`] is the seam between the session and the network. The
//! production implementation is [`HttpGateway`]; tests substitute their own.

mod http;

pub use http::HttpGateway;

use serde_json::Value;
use stocksim_core::{MalformedResult, SimulationRequest, SimulationResult};
use thiserror::Error;

/// Shown whenever the service gives no usable explanation for a failure
pub const GENERIC_FAILURE: &str = "Simulation failed. Please check the simulation service.";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GatewayError {
    /// The service refused the request; the message is safe to show as-is.
    #[error("{0}")]
    Failure(String),

    /// The request never produced a response. The cause is kept for the log.
    #[error("{}", GENERIC_FAILURE)]
    Transport(String),

    #[error("unexpected response from the simulation service: {0}")]
    Malformed(#[from] MalformedResult),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Unhealthy(String),
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }
}

pub trait SimulationGateway: Send {
    /// Run one simulation. Blocks until the service answers.
    fn simulate(&self, request: &SimulationRequest) -> Result<SimulationResult, GatewayError>;

    fn health(&self) -> HealthStatus;
}

/// Message for a failed response body: its `detail` string, or the generic text.
///
/// Non-string details (validation error arrays, objects) and non-JSON bodies
/// fall back to [`GENERIC_FAILURE`].
pub fn failure_message(body: &[u8]) -> String {
    serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("detail")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .filter(|detail| !detail.trim().is_empty())
        .unwrap_or_else(|| GENERIC_FAILURE.to_string())
}

/// Interpret a `/health` body; only `{"status": "healthy"}` counts as healthy.
pub fn health_from_body(body: &[u8]) -> HealthStatus {
    match serde_json::from_slice::<Value>(body) {
        Ok(value) => match value.get("status").and_then(Value::as_str) {
            Some("healthy") => HealthStatus::Healthy,
            Some(other) => HealthStatus::Unhealthy(format!("service reports status {other:?}")),
            None => HealthStatus::Unhealthy("health response has no status".to_string()),
        },
        Err(e) => HealthStatus::Unhealthy(format!("malformed health response: {e}")),
    }
}
