use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geo::GeoLocation;
use crate::telemetry::TripEvent;
use crate::vehicle::Vehicle;

/// A vehicle snapshot returned by a proximity query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyVehicle {
    #[serde(flatten)]
    pub vehicle: Vehicle,
    /// Great-circle distance from the query point.
    pub distance_meters: f64,
}

/// Mutation applied by [`FleetStorage::atomic_update`].
///
/// Receives the current record and returns its replacement, or an error that
/// aborts the update and leaves the record untouched.
pub type VehicleMutator<'a> = dyn Fn(&Vehicle) -> Result<Vehicle> + 'a;

/// Persistence collaborator behind the reservation engine.
///
/// Implementations must make `atomic_update` linearizable per vehicle id while
/// letting updates to different vehicles proceed in parallel. Proximity reads
/// may observe a vehicle that is reserved immediately afterwards.
pub trait FleetStorage: Send + Sync {
    /// Available vehicles within `radius_meters` of `point`, nearest first,
    /// ties broken by vehicle id.
    fn find_available_within_radius(
        &self,
        point: &GeoLocation,
        radius_meters: f64,
    ) -> Result<Vec<NearbyVehicle>>;

    /// Point read of a single vehicle.
    fn find_by_id(&self, vehicle_id: &str) -> Result<Vehicle>;

    /// Read-check-write on one vehicle under its exclusive lock.
    fn atomic_update(&self, vehicle_id: &str, mutator: &VehicleMutator<'_>) -> Result<Vehicle>;

    /// Append a telemetry event.
    fn insert_event(&self, event: TripEvent) -> Result<()>;

    /// All telemetry events in append order.
    fn list_events(&self) -> Result<Vec<TripEvent>>;

    /// Every vehicle, sorted by id.
    fn all_vehicles(&self) -> Result<Vec<Vehicle>>;
}
