//! fleetshare library entry points.
//!
//! This crate holds the reservation and trip-lifecycle engine for a shared
//! vehicle fleet: a proximity index over available vehicles, a reservation
//! store with per-vehicle compare-and-set, the begin/end-trip state machine,
//! and an append-only telemetry log. Higher-level consumers (CLI, HTTP
//! service) should go through [`Fleet`] instead of wiring the pieces by hand.
//!

#![deny(warnings)]

pub mod dataset;
pub mod error;
pub mod fleet;
pub mod geo;
pub mod history;
pub mod memory;
pub mod proximity;
pub mod reservation;
pub mod storage;
pub mod telemetry;
pub mod trip;
pub mod vehicle;

#[cfg(test)]
mod test_helpers;

pub use dataset::{demo_fleet, load_fleet, save_fleet, FleetDataset};
pub use error::{ConflictReason, Error, ErrorKind, Result};
pub use fleet::Fleet;
pub use geo::{GeoLocation, EARTH_RADIUS_METERS};
pub use history::{reconstruct_trips, TripHistory, TripRecord};
pub use memory::InMemoryStorage;
pub use proximity::ProximityIndex;
pub use reservation::ReservationStore;
pub use storage::{FleetStorage, NearbyVehicle, VehicleMutator};
pub use telemetry::{NewTripEvent, TelemetryLog, TripEvent, TripEventKind};
pub use trip::{TripEngine, TripState};
pub use vehicle::{Rider, Vehicle, VehicleId};
