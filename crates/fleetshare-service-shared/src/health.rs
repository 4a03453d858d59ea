//! Health check handlers for Kubernetes probes.
//!
//! Provides `/health/live` and `/health/ready` endpoints that return JSON
//! status responses for liveness and readiness probes.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::AppState;

/// Health status response for liveness and readiness probes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Status indicator: "ok" or "not_ready: <reason>".
    pub status: String,

    pub service: String,

    pub version: String,

    /// Number of vehicles in the fleet (readiness only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicles_loaded: Option<usize>,

    /// Number of vehicles currently free to reserve (readiness only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicles_available: Option<usize>,
}

impl HealthStatus {
    pub fn alive(service: &str, version: &str) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            version: version.to_string(),
            vehicles_loaded: None,
            vehicles_available: None,
        }
    }

    pub fn ready(service: &str, version: &str, loaded: usize, available: usize) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            version: version.to_string(),
            vehicles_loaded: Some(loaded),
            vehicles_available: Some(available),
        }
    }

    pub fn not_ready(service: &str, version: &str, reason: &str) -> Self {
        Self {
            status: format!("not_ready: {}", reason),
            service: service.to_string(),
            version: version.to_string(),
            vehicles_loaded: None,
            vehicles_available: None,
        }
    }
}

/// Liveness probe handler. Always 200 while the process serves requests.
pub async fn health_live() -> impl IntoResponse {
    let status = HealthStatus::alive(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    (StatusCode::OK, Json(status))
}

/// Readiness probe handler.
///
/// Ready once the fleet holds at least one vehicle and storage answers.
///
/// ```text
/// GET /health/ready
/// {"status":"ok","service":"fleetshare-service-shared","version":"0.1.0","vehicles_loaded":50,"vehicles_available":48}
/// ```
pub async fn health_ready(State(state): State<AppState>) -> Response {
    let service = env!("CARGO_PKG_NAME");
    let version = env!("CARGO_PKG_VERSION");

    let vehicles = match state.fleet().vehicles() {
        Ok(vehicles) => vehicles,
        Err(e) => {
            let status = HealthStatus::not_ready(service, version, &e.to_string());
            return (StatusCode::SERVICE_UNAVAILABLE, Json(status)).into_response();
        }
    };

    if vehicles.is_empty() {
        let status = HealthStatus::not_ready(service, version, "no vehicles loaded");
        return (StatusCode::SERVICE_UNAVAILABLE, Json(status)).into_response();
    }

    let available = vehicles.iter().filter(|v| v.is_available).count();
    let status = HealthStatus::ready(service, version, vehicles.len(), available);
    (StatusCode::OK, Json(status)).into_response()
}
