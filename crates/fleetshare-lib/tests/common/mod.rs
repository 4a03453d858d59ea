//! Common test utilities and fleet fixtures.

use std::path::PathBuf;
use std::sync::Arc;

use fleetshare_lib::{demo_fleet, save_fleet, Fleet, GeoLocation, InMemoryStorage, Vehicle};
use tempfile::TempDir;

/// Query point shared by fixtures.
#[allow(dead_code)]
pub fn origin() -> GeoLocation {
    GeoLocation::new(52.5466, 13.3512)
}

/// An available vehicle `meters_north` of [`origin`].
#[allow(dead_code)]
pub fn vehicle_at(id: &str, meters_north: f64) -> Vehicle {
    Vehicle::available(id, format!("Scooter {id}"), origin().offset_north(meters_north))
}

/// In-memory fleet over the given vehicles.
#[allow(dead_code)]
pub fn fleet_with(vehicles: Vec<Vehicle>) -> Fleet {
    let storage = InMemoryStorage::from_vehicles(vehicles).expect("valid test fleet");
    Fleet::new(Arc::new(storage))
}

/// Temporary directory holding a saved demo dataset.
#[allow(dead_code)]
pub struct DatasetFixture {
    _dir: TempDir,
    pub path: PathBuf,
}

/// Write a demo fleet to a throwaway file named `file_name`.
#[allow(dead_code)]
pub fn demo_dataset(file_name: &str, vehicles: usize, riders: usize) -> DatasetFixture {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join(file_name);
    save_fleet(&path, &demo_fleet(origin(), vehicles, riders)).expect("write demo fleet");
    DatasetFixture { _dir: dir, path }
}
