//! RFC 9457 Problem Details for HTTP APIs.
//!
//! Provides structured error responses following the Problem Details standard.
//! See: <https://www.rfc-editor.org/rfc/rfc9457.html>

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use fleetshare_lib::{Error as LibError, ErrorKind};

/// Problem type URI for invalid or missing request parameters.
pub const PROBLEM_INVALID_REQUEST: &str = "/problems/invalid-request";

/// Problem type URI for unknown vehicles.
pub const PROBLEM_VEHICLE_NOT_FOUND: &str = "/problems/vehicle-not-found";

/// Problem type URI for trip transitions refused by the vehicle's state.
pub const PROBLEM_OPERATION_NOT_ALLOWED: &str = "/problems/operation-not-allowed";

/// Problem type URI for a missing or wrong API key.
pub const PROBLEM_UNAUTHORIZED: &str = "/problems/unauthorized";

/// Problem type URI for internal server errors.
pub const PROBLEM_INTERNAL_ERROR: &str = "/problems/internal-error";

/// Problem type URI for storage that cannot serve requests.
pub const PROBLEM_SERVICE_UNAVAILABLE: &str = "/problems/service-unavailable";

/// RFC 9457 Problem Details response structure.
///
/// # Example
///
/// ```
/// use fleetshare_service_shared::{ProblemDetails, PROBLEM_VEHICLE_NOT_FOUND};
/// use axum::http::StatusCode;
///
/// let problem = ProblemDetails::new(
///     PROBLEM_VEHICLE_NOT_FOUND,
///     "Vehicle Not Found",
///     StatusCode::NOT_FOUND,
/// )
/// .with_detail("vehicle scooter-404 not found")
/// .with_request_id("req-12345");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemDetails {
    /// URI reference identifying the problem type (relative).
    #[serde(rename = "type")]
    pub type_uri: String,

    /// Short, human-readable summary of the problem.
    pub title: String,

    /// HTTP status code for this problem.
    pub status: u16,

    /// Human-readable explanation specific to this occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// Request ID of the failing call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,

    /// Content type for this response (always "application/problem+json").
    pub content_type: String,
}

impl ProblemDetails {
    pub fn new(type_uri: impl Into<String>, title: impl Into<String>, status: StatusCode) -> Self {
        Self {
            type_uri: type_uri.into(),
            title: title.into(),
            status: status.as_u16(),
            detail: None,
            instance: None,
            content_type: "application/problem+json".to_string(),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.instance = Some(request_id.into());
        self
    }

    /// 400 Bad Request for invalid input.
    pub fn bad_request(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_INVALID_REQUEST,
            "Invalid Request",
            StatusCode::BAD_REQUEST,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }

    /// 404 Not Found for an unknown vehicle.
    pub fn vehicle_not_found(vehicle_id: &str, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_VEHICLE_NOT_FOUND,
            "Vehicle Not Found",
            StatusCode::NOT_FOUND,
        )
        .with_detail(format!("Vehicle '{}' not found", vehicle_id))
        .with_request_id(request_id)
    }

    /// 409 Conflict when the vehicle's state forbids the transition.
    pub fn operation_not_allowed(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_OPERATION_NOT_ALLOWED,
            "Operation Not Allowed",
            StatusCode::CONFLICT,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }

    /// 401 Unauthorized for a missing or mismatched API key.
    pub fn unauthorized(request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_UNAUTHORIZED,
            "Unauthorized",
            StatusCode::UNAUTHORIZED,
        )
        .with_detail("A valid api_key query parameter or X-API-Key header is required")
        .with_request_id(request_id)
    }

    /// 500 Internal Server Error.
    pub fn internal_error(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_INTERNAL_ERROR,
            "Internal Error",
            StatusCode::INTERNAL_SERVER_ERROR,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }

    /// 503 Service Unavailable.
    pub fn service_unavailable(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_SERVICE_UNAVAILABLE,
            "Service Unavailable",
            StatusCode::SERVICE_UNAVAILABLE,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }
}

impl std::fmt::Display for ProblemDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.title,
            self.detail.as_deref().unwrap_or("")
        )
    }
}

impl std::error::Error for ProblemDetails {}

impl IntoResponse for ProblemDetails {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let mut response = Json(&self).into_response();
        response.headers_mut().insert(
            axum::http::header::CONTENT_TYPE,
            axum::http::HeaderValue::from_static("application/problem+json"),
        );

        *response.status_mut() = status;
        response
    }
}

/// Convert library errors to ProblemDetails by their [`ErrorKind`].
///
/// Empty and invalid arguments are 400, unknown vehicles 404, refused
/// transitions 409; everything else is a server-side failure.
pub fn from_lib_error(error: &LibError, request_id: &str) -> ProblemDetails {
    match (error.kind(), error) {
        (ErrorKind::NotFound, LibError::NotFound { vehicle_id }) => {
            ProblemDetails::vehicle_not_found(vehicle_id, request_id)
        }
        (ErrorKind::EmptyArgument | ErrorKind::InvalidArgument, _) => {
            ProblemDetails::bad_request(error.to_string(), request_id)
        }
        (ErrorKind::OperationNotAllowed, _) => {
            ProblemDetails::operation_not_allowed(error.to_string(), request_id)
        }
        (_, LibError::StorageUnavailable { .. }) => {
            ProblemDetails::service_unavailable(error.to_string(), request_id)
        }
        _ => ProblemDetails::internal_error(error.to_string(), request_id),
    }
}
