use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::dataset::{load_fleet, FleetDataset};
use crate::error::{Error, Result};
use crate::geo::GeoLocation;
use crate::history::{reconstruct_trips, TripHistory};
use crate::memory::InMemoryStorage;
use crate::reservation::ReservationStore;
use crate::storage::{FleetStorage, NearbyVehicle};
use crate::telemetry::{NewTripEvent, TelemetryLog, TripEvent};
use crate::trip::{TripEngine, TripState};
use crate::vehicle::{Rider, Vehicle};

/// Entry point for request handlers: proximity queries, the trip lifecycle,
/// and telemetry over one injected storage backend.
///
/// Cloning is cheap and every clone shares the same fleet state.
#[derive(Clone)]
pub struct Fleet {
    storage: Arc<dyn FleetStorage>,
    engine: TripEngine,
    telemetry: TelemetryLog,
    riders: Arc<Vec<Rider>>,
}

impl fmt::Debug for Fleet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fleet")
            .field("riders", &self.riders.len())
            .finish_non_exhaustive()
    }
}

impl Fleet {
    pub fn new(storage: Arc<dyn FleetStorage>) -> Self {
        let engine = TripEngine::new(ReservationStore::new(Arc::clone(&storage)));
        let telemetry = TelemetryLog::new(Arc::clone(&storage));
        Self {
            storage,
            engine,
            telemetry,
            riders: Arc::new(Vec::new()),
        }
    }

    /// Attach the rider registry carried by a dataset.
    pub fn with_riders(mut self, riders: Vec<Rider>) -> Self {
        self.riders = Arc::new(riders);
        self
    }

    /// Fleet backed by [`InMemoryStorage`].
    pub fn in_memory(vehicles: Vec<Vehicle>) -> Result<Self> {
        let storage = InMemoryStorage::from_vehicles(vehicles)?;
        Ok(Self::new(Arc::new(storage)))
    }

    pub fn from_dataset(dataset: FleetDataset) -> Result<Self> {
        Ok(Self::in_memory(dataset.vehicles)?.with_riders(dataset.riders))
    }

    /// Load a dataset from disk into an in-memory fleet.
    pub fn load(path: &Path) -> Result<Self> {
        Self::from_dataset(load_fleet(path)?)
    }

    /// Available vehicles within `radius_meters` of `point`, nearest first.
    ///
    /// The radius must be finite and strictly positive; zero is rejected
    /// rather than treated as "no results".
    pub fn query_nearby(&self, point: GeoLocation, radius_meters: f64) -> Result<Vec<NearbyVehicle>> {
        if !radius_meters.is_finite() || radius_meters <= 0.0 {
            return Err(Error::invalid(
                "radius",
                format!("{radius_meters} must be a positive number of meters"),
            ));
        }
        point.validate()?;
        self.storage.find_available_within_radius(&point, radius_meters)
    }

    pub fn begin_trip(&self, holder_id: &str, vehicle_id: &str) -> Result<Vehicle> {
        self.engine.begin_trip(holder_id, vehicle_id)
    }

    pub fn end_trip(&self, holder_id: &str, vehicle_id: &str) -> Result<Vehicle> {
        self.engine.end_trip(holder_id, vehicle_id)
    }

    pub fn end_trip_at(
        &self,
        holder_id: &str,
        vehicle_id: &str,
        location: GeoLocation,
    ) -> Result<Vehicle> {
        self.engine.end_trip_at(holder_id, vehicle_id, location)
    }

    pub fn trip_state(&self, vehicle_id: &str) -> Result<TripState> {
        self.engine.trip_state(vehicle_id)
    }

    pub fn append_event(&self, event: NewTripEvent) -> Result<TripEvent> {
        self.telemetry.append(event)
    }

    pub fn list_events(&self) -> Result<Vec<TripEvent>> {
        self.telemetry.list_all()
    }

    /// Trips reconstructed from the telemetry log.
    pub fn trips(&self) -> Result<TripHistory> {
        Ok(reconstruct_trips(&self.list_events()?))
    }

    pub fn vehicle(&self, vehicle_id: &str) -> Result<Vehicle> {
        self.storage.find_by_id(vehicle_id)
    }

    /// Every vehicle, sorted by id.
    pub fn vehicles(&self) -> Result<Vec<Vehicle>> {
        self.storage.all_vehicles()
    }

    pub fn riders(&self) -> &[Rider] {
        &self.riders
    }

    /// Current vehicles plus the rider registry, ready for `save_fleet`.
    pub fn snapshot(&self) -> Result<FleetDataset> {
        Ok(FleetDataset {
            vehicles: self.vehicles()?,
            riders: self.riders.to_vec(),
        })
    }
}
