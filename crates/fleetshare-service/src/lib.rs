//! Fleetshare vehicle reservation HTTP service.
//!
//! # Endpoints
//!
//! - `GET  /api/v1/vehicles/nearby?latitude=&longitude=&radius=` - Available vehicles, nearest first
//! - `GET  /api/v1/vehicles` - Every vehicle, sorted by id
//! - `GET  /api/v1/vehicles/{vehicle_id}` - One vehicle and its trip state
//! - `PUT  /api/v1/trips/begin` - Reserve a vehicle for a user
//! - `PUT  /api/v1/trips/end` - Release a vehicle, optionally at a new location
//! - `POST /api/v1/trip-events` - Append a telemetry event
//! - `GET  /api/v1/trip-events` - Telemetry in append order
//! - `GET  /api/v1/trips` - Trips reconstructed from telemetry
//! - `GET /metrics` - Prometheus metrics endpoint
//! - `GET /health/live`, `GET /health/ready` - Kubernetes probes
//!
//! When the state carries an API key, every `/api/v1` route requires it.

#![deny(warnings)]

pub mod handlers;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use fleetshare_service_shared::{
    health_live, health_ready, metrics_handler, require_api_key, AppState, MetricsLayer,
};

/// Build the service router over `state`, serving metrics at `metrics_path`.
pub fn app(state: AppState, metrics_path: &str) -> Router {
    let api = Router::new()
        .route("/vehicles", get(handlers::list_vehicles))
        .route("/vehicles/nearby", get(handlers::nearby_vehicles))
        .route("/vehicles/{vehicle_id}", get(handlers::get_vehicle))
        .route("/trips", get(handlers::list_trips))
        .route("/trips/begin", put(handlers::begin_trip))
        .route("/trips/end", put(handlers::end_trip))
        .route(
            "/trip-events",
            post(handlers::append_trip_event).get(handlers::list_trip_events),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_key,
        ));

    Router::new()
        .nest("/api/v1", api)
        .route(metrics_path, get(metrics_handler))
        .route("/health/live", get(health_live))
        .route("/health/ready", get(health_ready))
        .layer(MetricsLayer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
