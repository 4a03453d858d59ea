//! Route handlers. Each one validates its input, calls the fleet, and maps
//! library errors to Problem Details.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::{info, warn};

use fleetshare_lib::{Error as LibError, TripState};
use fleetshare_service_shared::{
    from_lib_error, record_nearby_returned, record_trip_ended, record_trip_event,
    record_trip_rejected, record_trip_started, AppState, BeginTripRequest, EndTripRequest,
    NearbyQuery, ProblemDetails, RequestId, ServiceResponse, TripAccepted, TripEventRequest,
    TripEventView, TripEventsResponse, TripResponse, TripsResponse, Validate, VehicleView,
    VehiclesResponse,
};

type ApiResult<T> = Result<ServiceResponse<T>, ProblemDetails>;

/// Single vehicle together with its lifecycle state.
#[derive(Debug, Serialize)]
pub struct VehicleDetail {
    #[serde(flatten)]
    pub vehicle: VehicleView,
    pub trip: TripState,
}

fn lib_problem(request_id: &RequestId) -> impl Fn(LibError) -> ProblemDetails + '_ {
    move |e| from_lib_error(&e, request_id.as_str())
}

fn trip_rejected(request_id: &RequestId) -> impl Fn(LibError) -> ProblemDetails + '_ {
    move |e| {
        warn!(request_id = %request_id, error = %e, "trip transition rejected");
        record_trip_rejected(&e);
        from_lib_error(&e, request_id.as_str())
    }
}

fn validated<T: Validate>(request: T, request_id: &RequestId) -> Result<T, ProblemDetails> {
    request.validate(request_id.as_str()).map_err(|p| *p)?;
    Ok(request)
}

fn json_body<T>(
    body: Result<Json<T>, JsonRejection>,
    request_id: &RequestId,
) -> Result<T, ProblemDetails> {
    body.map(|Json(request)| request)
        .map_err(|e| ProblemDetails::bad_request(e.body_text(), request_id.as_str()))
}

/// `GET /api/v1/vehicles/nearby`
pub async fn nearby_vehicles(
    State(state): State<AppState>,
    request_id: RequestId,
    query: Result<Query<NearbyQuery>, QueryRejection>,
) -> ApiResult<VehiclesResponse> {
    let Query(query) =
        query.map_err(|e| ProblemDetails::bad_request(e.body_text(), request_id.as_str()))?;
    let query = validated(query, &request_id)?;

    let nearby = state
        .fleet()
        .query_nearby(query.location(), query.radius)
        .map_err(lib_problem(&request_id))?;

    record_nearby_returned(nearby.len());
    info!(
        request_id = %request_id,
        latitude = query.latitude,
        longitude = query.longitude,
        radius = query.radius,
        found = nearby.len(),
        "nearby query answered"
    );

    Ok(ServiceResponse::new(nearby.into_iter().collect()))
}

/// `GET /api/v1/vehicles`
pub async fn list_vehicles(
    State(state): State<AppState>,
    request_id: RequestId,
) -> ApiResult<VehiclesResponse> {
    let vehicles = state.fleet().vehicles().map_err(lib_problem(&request_id))?;
    Ok(ServiceResponse::new(vehicles.into_iter().collect()))
}

/// `GET /api/v1/vehicles/{vehicle_id}`
pub async fn get_vehicle(
    State(state): State<AppState>,
    request_id: RequestId,
    Path(vehicle_id): Path<String>,
) -> ApiResult<VehicleDetail> {
    let vehicle = state
        .fleet()
        .vehicle(&vehicle_id)
        .map_err(lib_problem(&request_id))?;
    let trip = TripState::from(&vehicle);

    Ok(ServiceResponse::new(VehicleDetail {
        vehicle: vehicle.into(),
        trip,
    }))
}

/// `PUT /api/v1/trips/begin`
pub async fn begin_trip(
    State(state): State<AppState>,
    request_id: RequestId,
    body: Result<Json<BeginTripRequest>, JsonRejection>,
) -> ApiResult<TripResponse> {
    let request = validated(json_body(body, &request_id)?, &request_id)?;

    let vehicle = state
        .fleet()
        .begin_trip(&request.user_id, &request.vehicle_id)
        .map_err(trip_rejected(&request_id))?;

    record_trip_started();
    info!(
        request_id = %request_id,
        user = %request.user_id,
        vehicle = %request.vehicle_id,
        "trip started"
    );

    Ok(ServiceResponse::new(TripResponse {
        user_id: request.user_id,
        vehicle_id: request.vehicle_id,
        vehicle: vehicle.into(),
    }))
}

/// `PUT /api/v1/trips/end`
pub async fn end_trip(
    State(state): State<AppState>,
    request_id: RequestId,
    body: Result<Json<EndTripRequest>, JsonRejection>,
) -> ApiResult<TripResponse> {
    let request = validated(json_body(body, &request_id)?, &request_id)?;
    let fleet = state.fleet();

    let vehicle = match request.location {
        Some(location) => fleet.end_trip_at(&request.user_id, &request.vehicle_id, location),
        None => fleet.end_trip(&request.user_id, &request.vehicle_id),
    }
    .map_err(trip_rejected(&request_id))?;

    record_trip_ended();
    info!(
        request_id = %request_id,
        user = %request.user_id,
        vehicle = %request.vehicle_id,
        "trip ended"
    );

    Ok(ServiceResponse::new(TripResponse {
        user_id: request.user_id,
        vehicle_id: request.vehicle_id,
        vehicle: vehicle.into(),
    }))
}

/// `POST /api/v1/trip-events`
pub async fn append_trip_event(
    State(state): State<AppState>,
    request_id: RequestId,
    body: Result<Json<TripEventRequest>, JsonRejection>,
) -> Result<(StatusCode, ServiceResponse<TripAccepted>), ProblemDetails> {
    let request = validated(json_body(body, &request_id)?, &request_id)?;
    let event = request.to_event().map_err(lib_problem(&request_id))?;

    let stored = state
        .fleet()
        .append_event(event)
        .map_err(lib_problem(&request_id))?;

    record_trip_event(stored.kind);
    info!(
        request_id = %request_id,
        user = %stored.holder_id,
        vehicle = %stored.vehicle_id,
        kind = %stored.kind,
        "trip event logged"
    );

    Ok((
        StatusCode::CREATED,
        ServiceResponse::new(TripAccepted::success()),
    ))
}

/// `GET /api/v1/trip-events`
pub async fn list_trip_events(
    State(state): State<AppState>,
    request_id: RequestId,
) -> ApiResult<TripEventsResponse> {
    let events: Vec<TripEventView> = state
        .fleet()
        .list_events()
        .map_err(lib_problem(&request_id))?
        .into_iter()
        .map(TripEventView::from)
        .collect();

    Ok(ServiceResponse::new(TripEventsResponse {
        count: events.len(),
        events,
    }))
}

/// `GET /api/v1/trips`
pub async fn list_trips(
    State(state): State<AppState>,
    request_id: RequestId,
) -> ApiResult<TripsResponse> {
    let history = state.fleet().trips().map_err(lib_problem(&request_id))?;
    Ok(ServiceResponse::new(history.into()))
}
