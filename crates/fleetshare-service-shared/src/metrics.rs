//! Prometheus metrics for the fleetshare service.
//!
//! HTTP traffic is recorded by [`crate::MetricsLayer`]; the helpers here
//! record fleet business events.
//!
//! # Example
//!
//! ```no_run
//! use fleetshare_service_shared::metrics::{MetricsConfig, init_metrics, metrics_handler};
//! use axum::{Router, routing::get};
//!
//! let config = MetricsConfig::default();
//! init_metrics(&config).expect("failed to initialize metrics");
//!
//! let app: Router = Router::new()
//!     .route("/metrics", get(metrics_handler));
//! ```

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use fleetshare_lib::{ConflictReason, Error as LibError, TripEventKind};

/// Global Prometheus handle for rendering metrics.
static PROMETHEUS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    pub enabled: bool,
    /// Route serving the exposition text.
    pub path: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/metrics".to_string(),
        }
    }
}

impl MetricsConfig {
    /// - `METRICS_ENABLED`: anything but "false" enables (default: true)
    /// - `METRICS_PATH`: default "/metrics"
    pub fn from_env() -> Self {
        let enabled = std::env::var("METRICS_ENABLED")
            .map(|v| v.to_lowercase() != "false")
            .unwrap_or(true);

        let path = std::env::var("METRICS_PATH").unwrap_or_else(|_| "/metrics".to_string());

        Self { enabled, path }
    }
}

/// Install the Prometheus recorder. Only the first call can succeed.
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    if !config.enabled {
        return Err(MetricsError::Disabled);
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| MetricsError::InstallFailed(e.to_string()))?;

    PROMETHEUS_HANDLE
        .set(handle)
        .map_err(|_| MetricsError::AlreadyInitialized)?;

    Ok(())
}

/// Axum handler returning Prometheus exposition text.
pub async fn metrics_handler() -> String {
    PROMETHEUS_HANDLE
        .get()
        .map(|h| h.render())
        .unwrap_or_else(|| "# Metrics not initialized\n".to_string())
}

#[derive(Debug, Clone)]
pub enum MetricsError {
    Disabled,
    AlreadyInitialized,
    InstallFailed(String),
}

impl std::fmt::Display for MetricsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricsError::Disabled => write!(f, "metrics are disabled"),
            MetricsError::AlreadyInitialized => write!(f, "metrics recorder already initialized"),
            MetricsError::InstallFailed(e) => {
                write!(f, "failed to install metrics recorder: {}", e)
            }
        }
    }
}

impl std::error::Error for MetricsError {}

// =============================================================================
// Business Metrics Helpers
// =============================================================================

/// Increments `fleetshare_trips_started_total`.
pub fn record_trip_started() {
    metrics::counter!("fleetshare_trips_started_total").increment(1);
}

/// Increments `fleetshare_trips_ended_total`.
pub fn record_trip_ended() {
    metrics::counter!("fleetshare_trips_ended_total").increment(1);
}

/// Increments `fleetshare_trip_rejections_total` labelled with the reason.
pub fn record_trip_rejected(error: &LibError) {
    metrics::counter!(
        "fleetshare_trip_rejections_total",
        "reason" => rejection_reason(error)
    )
    .increment(1);
}

/// Increments `fleetshare_trip_events_total` labelled with the event kind.
pub fn record_trip_event(kind: TripEventKind) {
    metrics::counter!(
        "fleetshare_trip_events_total",
        "kind" => kind.as_str()
    )
    .increment(1);
}

/// Records to the `fleetshare_nearby_vehicles_returned` histogram.
pub fn record_nearby_returned(count: usize) {
    metrics::histogram!("fleetshare_nearby_vehicles_returned").record(count as f64);
}

/// Low-cardinality label for a rejected trip transition.
fn rejection_reason(error: &LibError) -> &'static str {
    match error {
        LibError::EmptyArgument { .. } => "empty_argument",
        LibError::InvalidArgument { .. } => "invalid_argument",
        LibError::NotFound { .. } => "not_found",
        LibError::Conflict { reason, .. } | LibError::OperationNotAllowed { reason, .. } => {
            match reason {
                ConflictReason::AlreadyReserved => "already_reserved",
                ConflictReason::HeldByAnotherHolder => "held_by_another",
                ConflictReason::NotReserved => "not_reserved",
            }
        }
        _ => "storage",
    }
}
