use axum_test::TestServer;
use serde_json::{json, Value};

use fleetshare_service::app;
use fleetshare_service_shared::test_utils::{test_state, test_state_with_key, FIXTURE_CENTER};

/// Server over a fresh demo fleet without authentication.
#[allow(dead_code)]
pub fn server() -> TestServer {
    TestServer::new(app(test_state(), "/metrics")).expect("failed to start test server")
}

/// Server over a fresh demo fleet requiring the test API key.
#[allow(dead_code)]
pub fn keyed_server() -> TestServer {
    TestServer::new(app(test_state_with_key(), "/metrics")).expect("failed to start test server")
}

/// Nearby query URL around the fixture centre.
#[allow(dead_code)]
pub fn nearby_url(radius: f64) -> String {
    format!(
        "/api/v1/vehicles/nearby?latitude={}&longitude={}&radius={}",
        FIXTURE_CENTER.latitude, FIXTURE_CENTER.longitude, radius
    )
}

#[allow(dead_code)]
pub fn trip_body(user_id: &str, vehicle_id: &str) -> Value {
    json!({ "user_id": user_id, "vehicle_id": vehicle_id })
}

#[allow(dead_code)]
pub fn event_body(user_id: &str, vehicle_id: &str, kind: &str, meters_north: f64) -> Value {
    let location = FIXTURE_CENTER.offset_north(meters_north);
    json!({
        "user_id": user_id,
        "vehicle_id": vehicle_id,
        "location": { "latitude": location.latitude, "longitude": location.longitude },
        "type": kind,
    })
}
