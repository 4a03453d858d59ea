mod common;

use std::future::IntoFuture;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use serde_json::{json, Value};

use common::{event_body, keyed_server, nearby_url, server, trip_body};
use fleetshare_service_shared::test_utils::{fixture_ids, FIXTURE_CENTER, TEST_API_KEY};

#[tokio::test]
async fn test_nearby_sorted_by_distance() {
    let server = server();

    let response = server.get(&nearby_url(100.0)).await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    let vehicles = body["vehicles"].as_array().unwrap();
    assert_eq!(body["count"], vehicles.len());
    assert_eq!(vehicles.len(), 6);
    assert_eq!(vehicles[0]["id"], fixture_ids::NEAREST_VEHICLE);

    let distances: Vec<f64> = vehicles
        .iter()
        .map(|v| v["distance_meters"].as_f64().unwrap())
        .collect();
    assert!(distances.windows(2).all(|w| w[0] <= w[1]));
    assert!(distances.iter().all(|d| *d <= 100.0));
}

#[tokio::test]
async fn test_nearby_rejects_bad_radius() {
    let server = server();

    let response = server.get(&nearby_url(0.0)).await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.headers()["content-type"],
        "application/problem+json"
    );
    let problem: Value = response.json();
    assert_eq!(problem["type"], "/problems/invalid-request");
}

#[tokio::test]
async fn test_nearby_rejects_missing_params() {
    let response = server().get("/api/v1/vehicles/nearby?latitude=52.5").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_vehicles_sorted() {
    let body: Value = server().get("/api/v1/vehicles").await.json();
    let ids: Vec<&str> = body["vehicles"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["id"].as_str().unwrap())
        .collect();
    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(ids, sorted);
    assert_eq!(body["count"], 20);
}

#[tokio::test]
async fn test_get_vehicle_unknown_is_404() {
    let response = server().get("/api/v1/vehicles/scooter-999").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let problem: Value = response.json();
    assert_eq!(problem["type"], "/problems/vehicle-not-found");
}

#[tokio::test]
async fn test_begin_trip_reserves_vehicle() {
    let server = server();

    let response = server
        .put("/api/v1/trips/begin")
        .json(&trip_body(fixture_ids::RIDER, fixture_ids::NEAREST_VEHICLE))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["user_id"], fixture_ids::RIDER);
    assert_eq!(body["vehicle"]["current_user_id"], fixture_ids::RIDER);
    assert_eq!(body["vehicle"]["is_available"], false);

    let nearby: Value = server.get(&nearby_url(50.0)).await.json();
    assert_eq!(nearby["count"], 0);

    let detail: Value = server
        .get(&format!("/api/v1/vehicles/{}", fixture_ids::NEAREST_VEHICLE))
        .await
        .json();
    assert_eq!(detail["trip"]["state"], "active");
    assert_eq!(detail["trip"]["holder"], fixture_ids::RIDER);
}

#[tokio::test]
async fn test_begin_trip_on_reserved_vehicle_conflicts() {
    let server = server();
    server
        .put("/api/v1/trips/begin")
        .json(&trip_body(fixture_ids::RIDER, fixture_ids::NEAREST_VEHICLE))
        .await;

    let response = server
        .put("/api/v1/trips/begin")
        .json(&trip_body(fixture_ids::OTHER_RIDER, fixture_ids::NEAREST_VEHICLE))
        .await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    let problem: Value = response.json();
    assert_eq!(problem["type"], "/problems/operation-not-allowed");
}

#[tokio::test]
async fn test_begin_trip_validation() {
    let server = server();

    let empty_user = server
        .put("/api/v1/trips/begin")
        .json(&trip_body("", fixture_ids::NEAREST_VEHICLE))
        .await;
    assert_eq!(empty_user.status_code(), StatusCode::BAD_REQUEST);

    let missing_field = server
        .put("/api/v1/trips/begin")
        .json(&json!({ "user_id": fixture_ids::RIDER }))
        .await;
    assert_eq!(missing_field.status_code(), StatusCode::BAD_REQUEST);

    let unknown = server
        .put("/api/v1/trips/begin")
        .json(&trip_body(fixture_ids::RIDER, "scooter-999"))
        .await;
    assert_eq!(unknown.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_concurrent_begin_has_one_winner() {
    let server = server();

    let first = server
        .put("/api/v1/trips/begin")
        .json(&trip_body(fixture_ids::RIDER, fixture_ids::OTHER_VEHICLE));
    let second = server
        .put("/api/v1/trips/begin")
        .json(&trip_body(fixture_ids::OTHER_RIDER, fixture_ids::OTHER_VEHICLE));
    let (first, second) = tokio::join!(first.into_future(), second.into_future());

    let mut statuses = [first.status_code().as_u16(), second.status_code().as_u16()];
    statuses.sort_unstable();
    assert_eq!(statuses, [200, 409]);
}

#[tokio::test]
async fn test_end_trip_by_other_user_conflicts() {
    let server = server();
    server
        .put("/api/v1/trips/begin")
        .json(&trip_body(fixture_ids::RIDER, fixture_ids::NEAREST_VEHICLE))
        .await;

    let response = server
        .put("/api/v1/trips/end")
        .json(&trip_body(fixture_ids::OTHER_RIDER, fixture_ids::NEAREST_VEHICLE))
        .await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);

    let idle = server
        .put("/api/v1/trips/end")
        .json(&trip_body(fixture_ids::RIDER, fixture_ids::OTHER_VEHICLE))
        .await;
    assert_eq!(idle.status_code(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_end_trip_at_location_moves_vehicle() {
    let server = server();
    server
        .put("/api/v1/trips/begin")
        .json(&trip_body(fixture_ids::RIDER, fixture_ids::NEAREST_VEHICLE))
        .await;

    let drop_off = FIXTURE_CENTER.offset_north(-2_000.0);
    let response = server
        .put("/api/v1/trips/end")
        .json(&json!({
            "user_id": fixture_ids::RIDER,
            "vehicle_id": fixture_ids::NEAREST_VEHICLE,
            "location": { "latitude": drop_off.latitude, "longitude": drop_off.longitude },
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["vehicle"]["is_available"], true);
    assert!(body["vehicle"].get("current_user_id").is_none());

    let url = format!(
        "/api/v1/vehicles/nearby?latitude={}&longitude={}&radius=10",
        drop_off.latitude, drop_off.longitude
    );
    let nearby: Value = server.get(&url).await.json();
    assert_eq!(nearby["count"], 1);
    assert_eq!(nearby["vehicles"][0]["id"], fixture_ids::NEAREST_VEHICLE);
}

#[tokio::test]
async fn test_trip_events_append_and_list() {
    let server = server();
    let (rider, vehicle) = (fixture_ids::RIDER, fixture_ids::NEAREST_VEHICLE);

    for (kind, north) in [
        ("trip_start", 0.0),
        ("trip-location-update", 10.0),
        ("trip_stop", 20.0),
    ] {
        let response = server
            .post("/api/v1/trip-events")
            .json(&event_body(rider, vehicle, kind, north))
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["success"], true);
    }

    let events: Value = server.get("/api/v1/trip-events").await.json();
    assert_eq!(events["count"], 3);
    assert_eq!(events["events"][0]["type"], "trip_start");
    assert_eq!(events["events"][1]["type"], "trip_location_update");
    assert_eq!(events["events"][2]["user_id"], rider);

    let trips: Value = server.get("/api/v1/trips").await.json();
    assert_eq!(trips["count"], 1);
    assert_eq!(trips["trips"][0]["path"].as_array().unwrap().len(), 3);
    assert!(trips["trips"][0]["ended_at"].is_string());
    assert!(trips["orphan_events"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_trip_event_rejects_unknown_type() {
    let server = server();
    let response = server
        .post("/api/v1/trip-events")
        .json(&event_body(
            fixture_ids::RIDER,
            fixture_ids::NEAREST_VEHICLE,
            "trip_pause",
            0.0,
        ))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let events: Value = server.get("/api/v1/trip-events").await.json();
    assert_eq!(events["count"], 0);
}

#[tokio::test]
async fn test_api_key_required_when_configured() {
    let server = keyed_server();

    let missing = server.get("/api/v1/vehicles").await;
    assert_eq!(missing.status_code(), StatusCode::UNAUTHORIZED);
    let problem: Value = missing.json();
    assert_eq!(problem["type"], "/problems/unauthorized");

    let wrong = server.get("/api/v1/vehicles?api_key=nope").await;
    assert_eq!(wrong.status_code(), StatusCode::UNAUTHORIZED);

    let by_query = server
        .get(&format!("/api/v1/vehicles?api_key={}", TEST_API_KEY))
        .await;
    assert_eq!(by_query.status_code(), StatusCode::OK);

    let by_header = server
        .get("/api/v1/vehicles")
        .add_header(
            HeaderName::from_static("x-api-key"),
            HeaderValue::from_static(TEST_API_KEY),
        )
        .await;
    assert_eq!(by_header.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_health_routes_skip_api_key() {
    let server = keyed_server();

    let live = server.get("/health/live").await;
    assert_eq!(live.status_code(), StatusCode::OK);

    let ready: Value = server.get("/health/ready").await.json();
    assert_eq!(ready["status"], "ok");
    assert_eq!(ready["vehicles_loaded"], 20);
}

#[tokio::test]
async fn test_request_id_echoed() {
    let server = server();

    let response = server
        .get("/health/live")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static("req-abc"),
        )
        .await;
    assert_eq!(response.headers()["x-request-id"], "req-abc");

    let problem: Value = server
        .get(&nearby_url(-1.0))
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static("req-def"),
        )
        .await
        .json();
    assert_eq!(problem["instance"], "req-def");
}
