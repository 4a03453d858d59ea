//! Response wrapper and payloads for successful HTTP responses.

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fleetshare_lib::{GeoLocation, NearbyVehicle, TripEvent, TripHistory, TripRecord, Vehicle};

/// Wrapper for successful responses with content type metadata.
///
/// Mirrors `ProblemDetails` by carrying the content type in the body.
///
/// # Example
///
/// ```
/// use fleetshare_service_shared::{ServiceResponse, TripAccepted};
///
/// let response = ServiceResponse::new(TripAccepted::success());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceResponse<T> {
    /// The actual response payload.
    #[serde(flatten)]
    pub data: T,

    /// Content type for this response.
    pub content_type: String,
}

impl<T> ServiceResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            content_type: "application/json".to_string(),
        }
    }
}

impl<T> From<T> for ServiceResponse<T> {
    fn from(data: T) -> Self {
        Self::new(data)
    }
}

impl<T: Serialize> IntoResponse for ServiceResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Vehicle as exposed over HTTP.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleView {
    pub id: String,
    pub name: String,
    pub location: GeoLocation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_user_id: Option<String>,
    pub is_available: bool,
    /// Present on proximity results only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_meters: Option<f64>,
}

impl From<Vehicle> for VehicleView {
    fn from(vehicle: Vehicle) -> Self {
        Self {
            id: vehicle.id,
            name: vehicle.name,
            location: vehicle.location,
            current_user_id: vehicle.holder,
            is_available: vehicle.is_available,
            distance_meters: None,
        }
    }
}

impl From<NearbyVehicle> for VehicleView {
    fn from(nearby: NearbyVehicle) -> Self {
        Self {
            distance_meters: Some(nearby.distance_meters),
            ..Self::from(nearby.vehicle)
        }
    }
}

/// Payload of the vehicle listing routes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehiclesResponse {
    pub count: usize,
    pub vehicles: Vec<VehicleView>,
}

impl<V: Into<VehicleView>> FromIterator<V> for VehiclesResponse {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        let vehicles: Vec<VehicleView> = iter.into_iter().map(Into::into).collect();
        Self {
            count: vehicles.len(),
            vehicles,
        }
    }
}

/// Payload of the begin/end trip routes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripResponse {
    pub user_id: String,
    pub vehicle_id: String,
    pub vehicle: VehicleView,
}

/// Payload of a successful telemetry append.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripAccepted {
    pub success: bool,
}

impl TripAccepted {
    pub fn success() -> Self {
        Self { success: true }
    }
}

/// Telemetry event as exposed over HTTP.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripEventView {
    pub user_id: String,
    pub vehicle_id: String,
    pub location: GeoLocation,
    #[serde(rename = "type")]
    pub kind: String,
    pub created_at: DateTime<Utc>,
}

impl From<TripEvent> for TripEventView {
    fn from(event: TripEvent) -> Self {
        Self {
            user_id: event.holder_id,
            vehicle_id: event.vehicle_id,
            location: event.location,
            kind: event.kind.to_string(),
            created_at: event.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripEventsResponse {
    pub count: usize,
    pub events: Vec<TripEventView>,
}

/// A reconstructed trip as exposed over HTTP.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripView {
    pub user_id: String,
    pub vehicle_id: String,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    pub distance_meters: f64,
    pub path: Vec<GeoLocation>,
}

impl From<TripRecord> for TripView {
    fn from(trip: TripRecord) -> Self {
        Self {
            distance_meters: trip.distance_meters(),
            user_id: trip.holder_id,
            vehicle_id: trip.vehicle_id,
            started_at: trip.started_at,
            ended_at: trip.ended_at,
            path: trip.path,
        }
    }
}

/// Payload of `GET /api/v1/trips`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripsResponse {
    pub count: usize,
    pub trips: Vec<TripView>,
    /// Events with no open trip for their user/vehicle pair.
    pub orphan_events: Vec<TripEventView>,
}

impl From<TripHistory> for TripsResponse {
    fn from(history: TripHistory) -> Self {
        let trips: Vec<TripView> = history.trips.into_iter().map(TripView::from).collect();
        Self {
            count: trips.len(),
            trips,
            orphan_events: history
                .orphans
                .into_iter()
                .map(TripEventView::from)
                .collect(),
        }
    }
}
