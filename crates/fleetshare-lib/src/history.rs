//! Trip reconstruction from the telemetry stream.
//!
//! Trips are never stored. A trip is the run of events for one
//! `(holder, vehicle)` pair from a `trip_start` to the next `trip_stop`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::GeoLocation;
use crate::telemetry::{TripEvent, TripEventKind};

/// One reconstructed trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRecord {
    pub holder_id: String,
    pub vehicle_id: String,
    pub started_at: DateTime<Utc>,
    /// `None` while the trip is still open, or when a new start superseded it.
    pub ended_at: Option<DateTime<Utc>>,
    /// Start location, every location update, and the stop location.
    pub path: Vec<GeoLocation>,
}

impl TripRecord {
    /// Sum of great-circle legs along the path, in meters.
    pub fn distance_meters(&self) -> f64 {
        self.path
            .windows(2)
            .map(|leg| leg[0].distance_to(&leg[1]))
            .sum()
    }
}

/// Output of [`reconstruct_trips`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TripHistory {
    /// Trips in order of their start events.
    pub trips: Vec<TripRecord>,
    /// Updates and stops that arrived with no open trip for their pair.
    pub orphans: Vec<TripEvent>,
}

/// Group events into trips. Events are taken in the order given, which for
/// the telemetry log is append order.
pub fn reconstruct_trips(events: &[TripEvent]) -> TripHistory {
    let mut history = TripHistory::default();
    let mut open: HashMap<(&str, &str), usize> = HashMap::new();

    for event in events {
        let key = (event.holder_id.as_str(), event.vehicle_id.as_str());
        match event.kind {
            TripEventKind::TripStart => {
                history.trips.push(TripRecord {
                    holder_id: event.holder_id.clone(),
                    vehicle_id: event.vehicle_id.clone(),
                    started_at: event.created_at,
                    ended_at: None,
                    path: vec![event.location],
                });
                open.insert(key, history.trips.len() - 1);
            }
            TripEventKind::TripLocationUpdate => match open.get(&key) {
                Some(&trip) => history.trips[trip].path.push(event.location),
                None => history.orphans.push(event.clone()),
            },
            TripEventKind::TripStop => match open.remove(&key) {
                Some(trip) => {
                    let record = &mut history.trips[trip];
                    record.path.push(event.location);
                    record.ended_at = Some(event.created_at);
                }
                None => history.orphans.push(event.clone()),
            },
        }
    }

    history
}
