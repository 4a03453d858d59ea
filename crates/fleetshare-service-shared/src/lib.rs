//! Shared infrastructure for the fleetshare HTTP service.
//!
//! - [`AppState`]: the loaded [`fleetshare_lib::Fleet`] plus the optional API key
//! - [`health`]: liveness/readiness handlers
//! - [`ProblemDetails`]: RFC 9457 Problem Details for error responses
//! - [`ServiceResponse`]: wrapper for successful responses
//! - [`metrics`]: Prometheus recorder and business counters
//! - [`logging`]: structured logging setup
//! - [`middleware`]: request IDs and HTTP metrics
//! - [`auth`]: API key check for `/api/v1`
//! - Request types with validation for each endpoint
//!
//! # Architecture
//!
//! Handlers stay thin; reservation and trip rules live in `fleetshare-lib`:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  axum Handler                                               │
//! │  - Parse query / JSON body                                  │
//! │  - Validate parameters                                      │
//! │  - Call fleetshare-lib                                      │
//! │  - Map errors to ProblemDetails                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Testing Support
//!
//! Enable the `test-utils` feature to use [`test_utils`] from dependent
//! crates.

#![deny(warnings)]

pub mod auth;
mod config;
mod health;
pub mod logging;
pub mod metrics;
pub mod middleware;
mod problem;
mod request;
mod response;
mod state;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use auth::{require_api_key, API_KEY_HEADER};
pub use config::{ServiceConfig, DEFAULT_DATA_PATH, DEFAULT_PORT};
pub use health::{health_live, health_ready, HealthStatus};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use metrics::{
    init_metrics, metrics_handler, record_nearby_returned, record_trip_ended, record_trip_event,
    record_trip_rejected, record_trip_started, MetricsConfig, MetricsError,
};
pub use middleware::{extract_or_generate_request_id, MetricsLayer, RequestId, REQUEST_ID_HEADER};
pub use problem::{
    from_lib_error, ProblemDetails, PROBLEM_INTERNAL_ERROR, PROBLEM_INVALID_REQUEST,
    PROBLEM_OPERATION_NOT_ALLOWED, PROBLEM_SERVICE_UNAVAILABLE, PROBLEM_UNAUTHORIZED,
    PROBLEM_VEHICLE_NOT_FOUND,
};
pub use request::{BeginTripRequest, EndTripRequest, NearbyQuery, TripEventRequest, Validate};
pub use response::{
    ServiceResponse, TripAccepted, TripEventView, TripEventsResponse, TripResponse, TripView,
    TripsResponse, VehicleView, VehiclesResponse,
};
pub use state::{AppState, AppStateError};
