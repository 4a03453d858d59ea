use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{require_non_empty, Error, Result};
use crate::geo::GeoLocation;
use crate::reservation::ReservationStore;
use crate::vehicle::Vehicle;

/// Lifecycle state of a vehicle as seen by the trip engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TripState {
    Idle,
    Active { holder: String },
}

impl From<&Vehicle> for TripState {
    fn from(vehicle: &Vehicle) -> Self {
        match &vehicle.holder {
            Some(holder) => TripState::Active {
                holder: holder.clone(),
            },
            None => TripState::Idle,
        }
    }
}

/// Begin/end-trip state machine over the reservation store.
///
/// Store conflicts surface as [`Error::OperationNotAllowed`]; nothing is
/// retried. Trips have no expiry and stay active until ended.
#[derive(Clone)]
pub struct TripEngine {
    store: ReservationStore,
}

impl TripEngine {
    pub fn new(store: ReservationStore) -> Self {
        Self { store }
    }

    /// Move a vehicle from `Idle` to `Active` for `holder_id`.
    pub fn begin_trip(&self, holder_id: &str, vehicle_id: &str) -> Result<Vehicle> {
        require_non_empty("holder_id", holder_id)?;
        require_non_empty("vehicle_id", vehicle_id)?;

        let vehicle = self
            .store
            .reserve(vehicle_id, holder_id)
            .map_err(not_allowed)?;
        debug!(holder = holder_id, vehicle = vehicle_id, "trip started");
        Ok(vehicle)
    }

    /// Move a vehicle held by `holder_id` back to `Idle`.
    pub fn end_trip(&self, holder_id: &str, vehicle_id: &str) -> Result<Vehicle> {
        self.finish(holder_id, vehicle_id, None)
    }

    /// Like [`TripEngine::end_trip`], also moving the vehicle to `location`.
    pub fn end_trip_at(
        &self,
        holder_id: &str,
        vehicle_id: &str,
        location: GeoLocation,
    ) -> Result<Vehicle> {
        self.finish(holder_id, vehicle_id, Some(location))
    }

    /// Current lifecycle state of a vehicle.
    pub fn trip_state(&self, vehicle_id: &str) -> Result<TripState> {
        require_non_empty("vehicle_id", vehicle_id)?;
        let vehicle = self.store.get_by_id(vehicle_id)?;
        Ok(TripState::from(&vehicle))
    }

    fn finish(
        &self,
        holder_id: &str,
        vehicle_id: &str,
        location: Option<GeoLocation>,
    ) -> Result<Vehicle> {
        require_non_empty("holder_id", holder_id)?;
        require_non_empty("vehicle_id", vehicle_id)?;

        let vehicle = self
            .store
            .release_at(vehicle_id, holder_id, location)
            .map_err(not_allowed)?;
        debug!(holder = holder_id, vehicle = vehicle_id, "trip ended");
        Ok(vehicle)
    }
}

fn not_allowed(err: Error) -> Error {
    match err {
        Error::Conflict { vehicle_id, reason } => {
            Error::OperationNotAllowed { vehicle_id, reason }
        }
        other => other,
    }
}
