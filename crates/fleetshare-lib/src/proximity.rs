//! KD-tree backed proximity index over vehicle positions.
//!
//! Positions are projected to Earth-centred Cartesian coordinates and stored in
//! a [`kiddo`] KD-tree. A great-circle radius converts to an equivalent chord
//! length, so the tree query is a plain Euclidean radius search; candidates are
//! then re-measured with the haversine formula and ordered nearest-first with
//! ties broken by vehicle id.
//!
//! The index only knows positions. Availability filtering happens in the
//! storage backend, which keeps the index in sync with committed vehicle
//! records.
//!
//! # Example
//!
//! ```
//! use fleetshare_lib::{GeoLocation, ProximityIndex};
//!
//! let origin = GeoLocation::new(52.5466, 13.3512);
//! let mut index = ProximityIndex::new();
//! index.insert("near", origin.offset_north(10.0));
//! index.insert("far", origin.offset_north(500.0));
//!
//! let hits = index.within_radius(&origin, 100.0);
//! assert_eq!(hits.len(), 1);
//! assert_eq!(hits[0].0, "near");
//! ```

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

use kiddo::float::kdtree::KdTree;
use kiddo::SquaredEuclidean;

use crate::geo::{chord_for_arc, GeoLocation};
use crate::vehicle::VehicleId;

/// KD-tree bucket size (kiddo default).
const BUCKET_SIZE: usize = 32;

/// Identifier of a distinct position stored in the tree.
type PointId = usize;

/// A distinct position and the vehicles currently parked on it.
///
/// Vehicles sharing identical coordinates share one tree entry; kiddo buckets
/// cannot split more than `BUCKET_SIZE` items with the same value.
struct IndexedPoint {
    location: GeoLocation,
    coords: [f64; 3],
    vehicles: BTreeSet<VehicleId>,
}

/// Spatial index answering radius queries over vehicle positions.
pub struct ProximityIndex {
    tree: KdTree<f64, PointId, 3, BUCKET_SIZE, u32>,
    points: HashMap<PointId, IndexedPoint>,
    point_ids: HashMap<(u64, u64), PointId>,
    vehicle_points: HashMap<VehicleId, PointId>,
    next_point: PointId,
}

impl fmt::Debug for ProximityIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProximityIndex")
            .field("vehicles", &self.vehicle_points.len())
            .field("points", &self.points.len())
            .finish()
    }
}

impl Default for ProximityIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl ProximityIndex {
    pub fn new() -> Self {
        Self {
            tree: KdTree::new(),
            points: HashMap::new(),
            point_ids: HashMap::new(),
            vehicle_points: HashMap::new(),
            next_point: 0,
        }
    }

    /// Build an index from `(vehicle, location)` pairs.
    pub fn build<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, GeoLocation)>,
        S: Into<VehicleId>,
    {
        let mut index = Self::new();
        for (vehicle_id, location) in entries {
            index.insert(vehicle_id, location);
        }
        index
    }

    /// Number of indexed vehicles.
    pub fn len(&self) -> usize {
        self.vehicle_points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicle_points.is_empty()
    }

    /// Indexed position of a vehicle, if present.
    pub fn location(&self, vehicle_id: &str) -> Option<GeoLocation> {
        self.vehicle_points
            .get(vehicle_id)
            .and_then(|point| self.points.get(point))
            .map(|point| point.location)
    }

    /// Add a vehicle at `location`, replacing any previous position.
    pub fn insert(&mut self, vehicle_id: impl Into<VehicleId>, location: GeoLocation) {
        let vehicle_id = vehicle_id.into();
        self.remove(&vehicle_id);

        let key = point_key(&location);
        let point_id = match self.point_ids.get(&key) {
            Some(existing) => *existing,
            None => {
                let point_id = self.next_point;
                self.next_point += 1;
                let coords = location.to_cartesian();
                self.tree.add(&coords, point_id);
                self.points.insert(
                    point_id,
                    IndexedPoint {
                        location,
                        coords,
                        vehicles: BTreeSet::new(),
                    },
                );
                self.point_ids.insert(key, point_id);
                point_id
            }
        };

        if let Some(point) = self.points.get_mut(&point_id) {
            point.vehicles.insert(vehicle_id.clone());
        }
        self.vehicle_points.insert(vehicle_id, point_id);
    }

    /// Drop a vehicle from the index. Returns whether it was present.
    pub fn remove(&mut self, vehicle_id: &str) -> bool {
        let Some(point_id) = self.vehicle_points.remove(vehicle_id) else {
            return false;
        };

        let now_empty = match self.points.get_mut(&point_id) {
            Some(point) => {
                point.vehicles.remove(vehicle_id);
                point.vehicles.is_empty()
            }
            None => false,
        };

        if now_empty {
            if let Some(point) = self.points.remove(&point_id) {
                self.tree.remove(&point.coords, point_id);
                self.point_ids.remove(&point_key(&point.location));
            }
        }
        true
    }

    /// Move an indexed vehicle. Equivalent to `insert` for unknown vehicles.
    pub fn relocate(&mut self, vehicle_id: &str, location: GeoLocation) {
        if self.location(vehicle_id) == Some(location) {
            return;
        }
        self.insert(vehicle_id, location);
    }

    /// Vehicles within `radius_meters` great-circle distance of `center`.
    ///
    /// Returns `(vehicle, distance_meters)` pairs ordered by distance, then by
    /// vehicle id. Callers validate inputs; a non-positive radius yields no
    /// results here.
    pub fn within_radius(&self, center: &GeoLocation, radius_meters: f64) -> Vec<(VehicleId, f64)> {
        if radius_meters <= 0.0 || self.points.is_empty() {
            return Vec::new();
        }

        // Pad the chord slightly so float error never drops a boundary point;
        // the haversine filter below is authoritative.
        let chord = chord_for_arc(radius_meters) * (1.0 + 1e-9) + 1e-6;
        let candidates = self
            .tree
            .within::<SquaredEuclidean>(&center.to_cartesian(), chord * chord);

        let mut hits: Vec<(VehicleId, f64)> = Vec::new();
        for neighbour in candidates {
            let Some(point) = self.points.get(&neighbour.item) else {
                continue;
            };
            let distance = center.distance_to(&point.location);
            if distance > radius_meters {
                continue;
            }
            hits.extend(point.vehicles.iter().map(|id| (id.clone(), distance)));
        }

        hits.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        hits
    }
}

/// Bit-exact key for a position, with `-0.0` folded into `0.0`.
fn point_key(location: &GeoLocation) -> (u64, u64) {
    fn bits(value: f64) -> u64 {
        if value == 0.0 {
            0.0f64.to_bits()
        } else {
            value.to_bits()
        }
    }
    (bits(location.latitude), bits(location.longitude))
}
