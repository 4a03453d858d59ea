//! Test utilities for handler testing.
//!
//! Builds a fresh in-memory demo fleet per call so tests that reserve
//! vehicles cannot interfere with each other.

use fleetshare_lib::{demo_fleet, Fleet, GeoLocation};

use crate::state::AppState;

/// Centre of the demo fleet.
pub const FIXTURE_CENTER: GeoLocation = GeoLocation {
    latitude: 52.5466,
    longitude: 13.3512,
};

/// Number of vehicles in the demo fleet.
pub const FIXTURE_VEHICLES: usize = 20;

/// API key used by [`test_state_with_key`].
pub const TEST_API_KEY: &str = "test-api-key";

/// Known vehicle and rider identifiers in the demo fleet.
pub mod fixture_ids {
    /// Vehicle nearest to the fixture centre.
    pub const NEAREST_VEHICLE: &str = "scooter-001";

    pub const OTHER_VEHICLE: &str = "scooter-002";

    pub const RIDER: &str = "rider-001";

    pub const OTHER_RIDER: &str = "rider-002";
}

/// A fresh AppState over the demo fleet, without an API key.
///
/// # Panics
///
/// Panics if the demo fleet is invalid, which indicates a broken fixture.
pub fn test_state() -> AppState {
    let fleet = Fleet::from_dataset(demo_fleet(FIXTURE_CENTER, FIXTURE_VEHICLES, 4))
        .unwrap_or_else(|e| panic!("failed to build demo fleet: {}", e));
    AppState::from_fleet(fleet)
}

/// Like [`test_state`] but requiring [`TEST_API_KEY`].
pub fn test_state_with_key() -> AppState {
    test_state().with_api_key(Some(TEST_API_KEY.to_string()))
}

/// Generate a unique request ID for testing.
pub fn test_request_id() -> String {
    format!("test-{}", uuid::Uuid::now_v7())
}
