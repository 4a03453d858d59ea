//! Shared API key check for `/api/v1` routes.
//!
//! When the state carries an API key, requests must present it either as the
//! `api_key` query parameter or the `X-API-Key` header.

use axum::{
    extract::{Query, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::middleware::RequestId;
use crate::{AppState, ProblemDetails};

/// Header alternative to the `api_key` query parameter.
pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Deserialize)]
struct ApiKeyParams {
    api_key: Option<String>,
}

fn presented_key(request: &Request) -> Option<String> {
    let from_query = Query::<ApiKeyParams>::try_from_uri(request.uri())
        .ok()
        .and_then(|Query(params)| params.api_key);

    from_query.or_else(|| {
        request
            .headers()
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    })
}

/// Middleware rejecting requests without the configured API key (401).
///
/// Install with `axum::middleware::from_fn_with_state`.
pub async fn require_api_key(
    State(state): State<AppState>,
    request_id: RequestId,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.api_key() else {
        return next.run(request).await;
    };

    match presented_key(&request) {
        Some(key) if key == expected => next.run(request).await,
        _ => {
            tracing::warn!(request_id = %request_id, "rejected request without valid api key");
            ProblemDetails::unauthorized(request_id.as_str()).into_response()
        }
    }
}
