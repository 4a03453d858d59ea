// Test-only helpers for `fleetshare-lib` unit tests
#![allow(dead_code)]
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::geo::GeoLocation;
use crate::memory::InMemoryStorage;
use crate::reservation::ReservationStore;
use crate::storage::{FleetStorage, NearbyVehicle, VehicleMutator};
use crate::telemetry::TripEvent;
use crate::trip::TripEngine;
use crate::vehicle::Vehicle;

/// Reference point used across tests (Berlin, Wedding).
pub fn origin() -> GeoLocation {
    GeoLocation::new(52.5466, 13.3512)
}

/// An available vehicle `meters_north` of [`origin`].
pub fn vehicle_at(id: &str, meters_north: f64) -> Vehicle {
    Vehicle::available(id, format!("Scooter {id}"), origin().offset_north(meters_north))
}

pub fn storage_with(vehicles: Vec<Vehicle>) -> Arc<InMemoryStorage> {
    Arc::new(InMemoryStorage::from_vehicles(vehicles).expect("valid test fleet"))
}

pub fn store_with(vehicles: Vec<Vehicle>) -> ReservationStore {
    ReservationStore::new(storage_with(vehicles))
}

pub fn engine_with(vehicles: Vec<Vehicle>) -> TripEngine {
    TripEngine::new(store_with(vehicles))
}

/// Backend whose every call fails with [`Error::StorageUnavailable`].
pub struct UnavailableStorage;

pub const UNAVAILABLE_MESSAGE: &str = "backend offline";

fn unavailable<T>() -> Result<T> {
    Err(Error::StorageUnavailable {
        message: UNAVAILABLE_MESSAGE.to_string(),
    })
}

impl FleetStorage for UnavailableStorage {
    fn find_available_within_radius(
        &self,
        _point: &GeoLocation,
        _radius_meters: f64,
    ) -> Result<Vec<NearbyVehicle>> {
        unavailable()
    }

    fn find_by_id(&self, _vehicle_id: &str) -> Result<Vehicle> {
        unavailable()
    }

    fn atomic_update(&self, _vehicle_id: &str, _mutator: &VehicleMutator<'_>) -> Result<Vehicle> {
        unavailable()
    }

    fn insert_event(&self, _event: TripEvent) -> Result<()> {
        unavailable()
    }

    fn list_events(&self) -> Result<Vec<TripEvent>> {
        unavailable()
    }

    fn all_vehicles(&self) -> Result<Vec<Vehicle>> {
        unavailable()
    }
}
