//! In-process [`FleetStorage`] backend.
//!
//! Each vehicle record sits behind its own `Mutex`; the map holding them is
//! fixed at construction, so no global lock is taken on the reservation path.
//! The proximity index holds only available vehicles and is updated under the
//! vehicle lock whenever a committed record changes availability or position.
//!
//! Lock order is always vehicle lock, then index lock. Proximity queries read
//! the index, release it, and only then snapshot individual vehicles.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError, RwLock};

use tracing::debug;

use crate::error::{Error, Result};
use crate::geo::GeoLocation;
use crate::proximity::ProximityIndex;
use crate::storage::{FleetStorage, NearbyVehicle, VehicleMutator};
use crate::telemetry::TripEvent;
use crate::vehicle::{Vehicle, VehicleId};

pub struct InMemoryStorage {
    vehicles: HashMap<VehicleId, Mutex<Vehicle>>,
    index: RwLock<ProximityIndex>,
    events: Mutex<Vec<TripEvent>>,
}

impl std::fmt::Debug for InMemoryStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStorage")
            .field("vehicles", &self.vehicles.len())
            .finish_non_exhaustive()
    }
}

impl InMemoryStorage {
    /// Build a store from an initial set of vehicles.
    ///
    /// Every record must satisfy [`Vehicle::validate`]; ids must be unique.
    pub fn from_vehicles(vehicles: impl IntoIterator<Item = Vehicle>) -> Result<Self> {
        let mut records = HashMap::new();
        let mut index = ProximityIndex::new();
        for vehicle in vehicles {
            vehicle.validate()?;
            if records.contains_key(&vehicle.id) {
                return Err(Error::DuplicateVehicle {
                    vehicle_id: vehicle.id,
                });
            }
            if vehicle.is_available {
                index.insert(vehicle.id.clone(), vehicle.location);
            }
            records.insert(vehicle.id.clone(), Mutex::new(vehicle));
        }

        debug!(
            vehicles = records.len(),
            available = index.len(),
            "initialised in-memory fleet storage"
        );

        Ok(Self {
            vehicles: records,
            index: RwLock::new(index),
            events: Mutex::new(Vec::new()),
        })
    }

    /// Number of vehicles held.
    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    fn record(&self, vehicle_id: &str) -> Result<&Mutex<Vehicle>> {
        self.vehicles
            .get(vehicle_id)
            .ok_or_else(|| Error::not_found(vehicle_id))
    }
}

fn poisoned<T>(_: PoisonError<T>) -> Error {
    Error::StorageUnavailable {
        message: "fleet storage lock poisoned".to_string(),
    }
}

impl FleetStorage for InMemoryStorage {
    fn find_available_within_radius(
        &self,
        point: &GeoLocation,
        radius_meters: f64,
    ) -> Result<Vec<NearbyVehicle>> {
        let candidates = {
            let index = self.index.read().map_err(poisoned)?;
            index.within_radius(point, radius_meters)
        };

        let mut nearby = Vec::with_capacity(candidates.len());
        for (vehicle_id, _) in candidates {
            let Some(record) = self.vehicles.get(&vehicle_id) else {
                continue;
            };
            let snapshot = record.lock().map_err(poisoned)?.clone();
            if !snapshot.is_available {
                continue;
            }
            // The vehicle may have moved since the index was read.
            let distance_meters = point.distance_to(&snapshot.location);
            if distance_meters > radius_meters {
                continue;
            }
            nearby.push(NearbyVehicle {
                vehicle: snapshot,
                distance_meters,
            });
        }

        nearby.sort_by(|a, b| {
            a.distance_meters
                .partial_cmp(&b.distance_meters)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.vehicle.id.cmp(&b.vehicle.id))
        });
        Ok(nearby)
    }

    fn find_by_id(&self, vehicle_id: &str) -> Result<Vehicle> {
        let record = self.record(vehicle_id)?;
        let vehicle = record.lock().map_err(poisoned)?;
        Ok(vehicle.clone())
    }

    fn atomic_update(&self, vehicle_id: &str, mutator: &VehicleMutator<'_>) -> Result<Vehicle> {
        let record = self.record(vehicle_id)?;
        let mut current = record.lock().map_err(poisoned)?;

        let updated = mutator(&*current)?;
        if updated.id != current.id {
            return Err(Error::invalid(
                "vehicle_id",
                format!("update may not change id {} to {}", current.id, updated.id),
            ));
        }
        updated.validate()?;

        let visibility_changed = updated.is_available != current.is_available;
        let moved = updated.location != current.location;
        if visibility_changed || (updated.is_available && moved) {
            let mut index = self.index.write().map_err(poisoned)?;
            if updated.is_available {
                index.relocate(&updated.id, updated.location);
            } else {
                index.remove(&updated.id);
            }
        }

        *current = updated.clone();
        Ok(updated)
    }

    fn insert_event(&self, event: TripEvent) -> Result<()> {
        self.events.lock().map_err(poisoned)?.push(event);
        Ok(())
    }

    fn list_events(&self) -> Result<Vec<TripEvent>> {
        Ok(self.events.lock().map_err(poisoned)?.clone())
    }

    fn all_vehicles(&self) -> Result<Vec<Vehicle>> {
        let mut vehicles = Vec::with_capacity(self.vehicles.len());
        for record in self.vehicles.values() {
            vehicles.push(record.lock().map_err(poisoned)?.clone());
        }
        vehicles.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(vehicles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{origin, vehicle_at};

    #[test]
    fn test_from_vehicles_rejects_duplicates() {
        let result = InMemoryStorage::from_vehicles(vec![
            vehicle_at("v-1", 0.0),
            vehicle_at("v-1", 10.0),
        ]);
        assert!(matches!(result, Err(Error::DuplicateVehicle { .. })));
    }

    #[test]
    fn test_from_vehicles_rejects_broken_invariant() {
        let mut broken = vehicle_at("v-1", 0.0);
        broken.is_available = false;
        let result = InMemoryStorage::from_vehicles(vec![broken]);
        assert!(matches!(result, Err(Error::InvalidArgument { .. })));
    }

    #[test]
    fn test_reserved_vehicles_are_not_indexed() {
        let reserved = vehicle_at("v-2", 20.0).reserved_by("rider-1");
        let storage =
            InMemoryStorage::from_vehicles(vec![vehicle_at("v-1", 10.0), reserved]).unwrap();

        let nearby = storage
            .find_available_within_radius(&origin(), 100.0)
            .unwrap();
        assert_eq!(nearby.len(), 1);
        assert_eq!(nearby[0].vehicle.id, "v-1");
    }

    #[test]
    fn test_atomic_update_error_leaves_record_untouched() {
        let storage = InMemoryStorage::from_vehicles(vec![vehicle_at("v-1", 10.0)]).unwrap();
        let result = storage.atomic_update("v-1", &|_| Err(Error::not_found("nope")));
        assert!(result.is_err());
        assert_eq!(storage.find_by_id("v-1").unwrap(), vehicle_at("v-1", 10.0));
    }

    #[test]
    fn test_atomic_update_rejects_id_change_and_invalid_state() {
        let storage = InMemoryStorage::from_vehicles(vec![vehicle_at("v-1", 10.0)]).unwrap();

        let renamed = storage.atomic_update("v-1", &|v| {
            Ok(Vehicle {
                id: "v-other".to_string(),
                ..v.clone()
            })
        });
        assert!(matches!(renamed, Err(Error::InvalidArgument { .. })));

        let inconsistent = storage.atomic_update("v-1", &|v| {
            Ok(Vehicle {
                is_available: false,
                ..v.clone()
            })
        });
        assert!(matches!(inconsistent, Err(Error::InvalidArgument { .. })));
        assert!(storage.find_by_id("v-1").unwrap().is_available);
    }

    #[test]
    fn test_atomic_update_keeps_index_in_sync() {
        let storage = InMemoryStorage::from_vehicles(vec![vehicle_at("v-1", 10.0)]).unwrap();

        storage
            .atomic_update("v-1", &|v| Ok(v.reserved_by("rider-1")))
            .unwrap();
        assert!(storage
            .find_available_within_radius(&origin(), 100.0)
            .unwrap()
            .is_empty());

        let far = origin().offset_north(5_000.0);
        storage
            .atomic_update("v-1", &|v| Ok(v.released(Some(far))))
            .unwrap();
        assert!(storage
            .find_available_within_radius(&origin(), 100.0)
            .unwrap()
            .is_empty());
        assert_eq!(
            storage
                .find_available_within_radius(&far, 1.0)
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn test_unknown_vehicle_is_not_found() {
        let storage = InMemoryStorage::from_vehicles(Vec::new()).unwrap();
        assert!(storage.is_empty());
        assert!(matches!(
            storage.find_by_id("ghost"),
            Err(Error::NotFound { .. })
        ));
        assert!(matches!(
            storage.atomic_update("ghost", &|v| Ok(v.clone())),
            Err(Error::NotFound { .. })
        ));
    }

    #[test]
    fn test_all_vehicles_sorted() {
        let storage = InMemoryStorage::from_vehicles(vec![
            vehicle_at("v-3", 0.0),
            vehicle_at("v-1", 0.0),
            vehicle_at("v-2", 0.0),
        ])
        .unwrap();
        let ids: Vec<String> = storage
            .all_vehicles()
            .unwrap()
            .into_iter()
            .map(|v| v.id)
            .collect();
        assert_eq!(ids, vec!["v-1", "v-2", "v-3"]);
        assert_eq!(storage.len(), 3);
    }
}
