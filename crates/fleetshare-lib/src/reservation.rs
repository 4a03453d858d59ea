use std::sync::Arc;

use tracing::debug;

use crate::error::{ConflictReason, Error, Result};
use crate::geo::GeoLocation;
use crate::storage::FleetStorage;
use crate::vehicle::Vehicle;

/// Compare-and-set reservations on top of a [`FleetStorage`].
///
/// Every transition runs inside a single `atomic_update`, so for concurrent
/// `reserve` calls on one vehicle at most one succeeds until a matching
/// `release` commits.
#[derive(Clone)]
pub struct ReservationStore {
    storage: Arc<dyn FleetStorage>,
}

impl ReservationStore {
    pub fn new(storage: Arc<dyn FleetStorage>) -> Self {
        Self { storage }
    }

    /// Claim an available vehicle for `holder_id`.
    ///
    /// Fails with [`Error::Conflict`] when the vehicle is already reserved,
    /// including by the same holder.
    pub fn reserve(&self, vehicle_id: &str, holder_id: &str) -> Result<Vehicle> {
        let reserved = self.storage.atomic_update(vehicle_id, &|current| {
            if !current.is_available {
                return Err(conflict(current, ConflictReason::AlreadyReserved));
            }
            Ok(current.reserved_by(holder_id))
        })?;
        debug!(vehicle = vehicle_id, holder = holder_id, "vehicle reserved");
        Ok(reserved)
    }

    /// Release a vehicle held by `holder_id`, leaving it where it is.
    pub fn release(&self, vehicle_id: &str, holder_id: &str) -> Result<Vehicle> {
        self.release_at(vehicle_id, holder_id, None)
    }

    /// Release a vehicle held by `holder_id`, optionally moving it to
    /// `location` in the same step.
    pub fn release_at(
        &self,
        vehicle_id: &str,
        holder_id: &str,
        location: Option<GeoLocation>,
    ) -> Result<Vehicle> {
        if let Some(location) = &location {
            location.validate()?;
        }
        let released = self.storage.atomic_update(vehicle_id, &|current| {
            match &current.holder {
                None => Err(conflict(current, ConflictReason::NotReserved)),
                Some(holder) if holder != holder_id => {
                    Err(conflict(current, ConflictReason::HeldByAnotherHolder))
                }
                Some(_) => Ok(current.released(location)),
            }
        })?;
        debug!(vehicle = vehicle_id, holder = holder_id, "vehicle released");
        Ok(released)
    }

    /// Point read of a vehicle record.
    pub fn get_by_id(&self, vehicle_id: &str) -> Result<Vehicle> {
        self.storage.find_by_id(vehicle_id)
    }
}

fn conflict(vehicle: &Vehicle, reason: ConflictReason) -> Error {
    Error::Conflict {
        vehicle_id: vehicle.id.clone(),
        reason,
    }
}
