//! Request types and validation for HTTP endpoints.
//!
//! Field names follow the public JSON contract (`user_id`, `vehicle_id`,
//! `type`); the library's own names (`holder_id`, `kind`) stay internal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fleetshare_lib::{GeoLocation, NewTripEvent, TripEventKind};

use crate::ProblemDetails;

/// Validation trait for request types.
///
/// Implementations reject malformed input with a `ProblemDetails` before the
/// request reaches the fleet.
pub trait Validate {
    /// Validate the request, returning an error if invalid.
    ///
    /// Returns a boxed `ProblemDetails` to avoid large `Result::Err` variants.
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>>;
}

fn require(field: &str, value: &str, request_id: &str) -> Result<(), Box<ProblemDetails>> {
    if value.trim().is_empty() {
        return Err(Box::new(ProblemDetails::bad_request(
            format!("The '{}' field is required and cannot be empty", field),
            request_id,
        )));
    }
    Ok(())
}

fn check_location(location: &GeoLocation, request_id: &str) -> Result<(), Box<ProblemDetails>> {
    location
        .validate()
        .map_err(|e| Box::new(ProblemDetails::bad_request(e.to_string(), request_id)))
}

/// Query string of `GET /api/v1/vehicles/nearby`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearbyQuery {
    pub latitude: f64,
    pub longitude: f64,
    /// Search radius in meters.
    pub radius: f64,
}

impl NearbyQuery {
    pub fn location(&self) -> GeoLocation {
        GeoLocation::new(self.latitude, self.longitude)
    }
}

impl Validate for NearbyQuery {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(Box::new(ProblemDetails::bad_request(
                "The 'radius' parameter must be a positive number of meters",
                request_id,
            )));
        }
        check_location(&self.location(), request_id)
    }
}

/// Body of `PUT /api/v1/trips/begin`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeginTripRequest {
    pub user_id: String,
    pub vehicle_id: String,
}

impl Validate for BeginTripRequest {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        require("user_id", &self.user_id, request_id)?;
        require("vehicle_id", &self.vehicle_id, request_id)
    }
}

/// Body of `PUT /api/v1/trips/end`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndTripRequest {
    pub user_id: String,
    pub vehicle_id: String,
    /// Where the vehicle was left; omitted keeps its last known position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoLocation>,
}

impl Validate for EndTripRequest {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        require("user_id", &self.user_id, request_id)?;
        require("vehicle_id", &self.vehicle_id, request_id)?;
        match &self.location {
            Some(location) => check_location(location, request_id),
            None => Ok(()),
        }
    }
}

/// Body of `POST /api/v1/trip-events`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripEventRequest {
    pub user_id: String,
    pub vehicle_id: String,
    pub location: GeoLocation,
    /// `trip_start`, `trip_location_update`, or `trip_stop` (kebab case also
    /// accepted).
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl TripEventRequest {
    /// Convert into the library event, parsing the event kind.
    pub fn to_event(&self) -> fleetshare_lib::Result<NewTripEvent> {
        let kind: TripEventKind = self.kind.parse()?;
        Ok(NewTripEvent {
            holder_id: self.user_id.clone(),
            vehicle_id: self.vehicle_id.clone(),
            location: self.location,
            kind,
            created_at: self.created_at,
        })
    }
}

impl Validate for TripEventRequest {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        require("user_id", &self.user_id, request_id)?;
        require("vehicle_id", &self.vehicle_id, request_id)?;
        require("type", &self.kind, request_id)?;
        check_location(&self.location, request_id)?;
        self.kind
            .parse::<TripEventKind>()
            .map(|_| ())
            .map_err(|e| Box::new(ProblemDetails::bad_request(e.to_string(), request_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event_request(kind: &str) -> TripEventRequest {
        TripEventRequest {
            user_id: "rider-1".to_string(),
            vehicle_id: "scooter-001".to_string(),
            location: GeoLocation::new(52.5, 13.4),
            kind: kind.to_string(),
            created_at: None,
        }
    }

    #[test]
    fn test_nearby_query_validation() {
        let valid = NearbyQuery {
            latitude: 52.5,
            longitude: 13.4,
            radius: 100.0,
        };
        assert!(valid.validate("req").is_ok());

        let zero = NearbyQuery {
            radius: 0.0,
            ..valid.clone()
        };
        assert_eq!(zero.validate("req").unwrap_err().status, 400);

        let off_map = NearbyQuery {
            latitude: 95.0,
            ..valid
        };
        let problem = off_map.validate("req").unwrap_err();
        assert!(problem.detail.as_deref().unwrap().contains("latitude"));
    }

    #[test]
    fn test_begin_trip_requires_ids() {
        let request = BeginTripRequest {
            user_id: " ".to_string(),
            vehicle_id: "scooter-001".to_string(),
        };
        let problem = request.validate("req-1").unwrap_err();
        assert!(problem.detail.as_deref().unwrap().contains("user_id"));
        assert_eq!(problem.instance.as_deref(), Some("req-1"));
    }

    #[test]
    fn test_end_trip_location_optional() {
        let request: EndTripRequest =
            serde_json::from_str(r#"{"user_id":"rider-1","vehicle_id":"scooter-001"}"#).unwrap();
        assert!(request.location.is_none());
        assert!(request.validate("req").is_ok());

        let request: EndTripRequest = serde_json::from_str(
            r#"{"user_id":"rider-1","vehicle_id":"scooter-001","location":{"latitude":0.0,"longitude":181.0}}"#,
        )
        .unwrap();
        assert!(request.validate("req").is_err());
    }

    #[test]
    fn test_trip_event_kind_validation() {
        assert!(event_request("trip_start").validate("req").is_ok());
        assert!(event_request("trip-location-update").validate("req").is_ok());
        assert!(event_request("trip-pause").validate("req").is_err());
        assert!(event_request("").validate("req").is_err());
    }

    #[test]
    fn test_trip_event_json_contract() {
        let request: TripEventRequest = serde_json::from_str(
            r#"{
                "user_id": "rider-1",
                "vehicle_id": "scooter-001",
                "location": {"latitude": 52.5, "longitude": 13.4},
                "type": "trip_stop",
                "created_at": "2024-05-01T12:00:00Z"
            }"#,
        )
        .unwrap();

        let event = request.to_event().unwrap();
        assert_eq!(event.kind, TripEventKind::TripStop);
        assert_eq!(event.holder_id, "rider-1");
        assert!(event.created_at.is_some());
    }
}
