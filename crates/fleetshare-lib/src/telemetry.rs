use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{require_non_empty, Error, Result};
use crate::geo::GeoLocation;
use crate::storage::FleetStorage;

/// Kind of trip telemetry event.
///
/// Serialized in snake case (`trip_start`); parsing also accepts the kebab
/// case spelling (`trip-start`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripEventKind {
    #[serde(alias = "trip-start")]
    TripStart,
    #[serde(alias = "trip-location-update")]
    TripLocationUpdate,
    #[serde(alias = "trip-stop")]
    TripStop,
}

impl TripEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripEventKind::TripStart => "trip_start",
            TripEventKind::TripLocationUpdate => "trip_location_update",
            TripEventKind::TripStop => "trip_stop",
        }
    }
}

impl fmt::Display for TripEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TripEventKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "trip_start" => Ok(TripEventKind::TripStart),
            "trip_location_update" => Ok(TripEventKind::TripLocationUpdate),
            "trip_stop" => Ok(TripEventKind::TripStop),
            "" => Err(Error::EmptyArgument { field: "type" }),
            _ => Err(Error::invalid(
                "type",
                format!(
                    "unknown event kind '{}'; expected trip-start, trip-location-update, or trip-stop",
                    s
                ),
            )),
        }
    }
}

/// An immutable, timestamped fact about a trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripEvent {
    pub holder_id: String,
    pub vehicle_id: String,
    pub location: GeoLocation,
    pub kind: TripEventKind,
    pub created_at: DateTime<Utc>,
}

/// Event submitted to [`TelemetryLog::append`]; the log stamps it when
/// `created_at` is absent.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTripEvent {
    pub holder_id: String,
    pub vehicle_id: String,
    pub location: GeoLocation,
    pub kind: TripEventKind,
    pub created_at: Option<DateTime<Utc>>,
}

impl NewTripEvent {
    pub fn new(
        holder_id: impl Into<String>,
        vehicle_id: impl Into<String>,
        location: GeoLocation,
        kind: TripEventKind,
    ) -> Self {
        Self {
            holder_id: holder_id.into(),
            vehicle_id: vehicle_id.into(),
            location,
            kind,
            created_at: None,
        }
    }

    pub fn at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }
}

/// Append-only trip event log.
///
/// Independent of reservation state: appends never consult vehicles.
#[derive(Clone)]
pub struct TelemetryLog {
    storage: Arc<dyn FleetStorage>,
}

impl TelemetryLog {
    pub fn new(storage: Arc<dyn FleetStorage>) -> Self {
        Self { storage }
    }

    /// Validate and store an event, returning the stored record.
    pub fn append(&self, event: NewTripEvent) -> Result<TripEvent> {
        require_non_empty("holder_id", &event.holder_id)?;
        require_non_empty("vehicle_id", &event.vehicle_id)?;
        event.location.validate()?;

        let stored = TripEvent {
            holder_id: event.holder_id,
            vehicle_id: event.vehicle_id,
            location: event.location,
            kind: event.kind,
            created_at: event.created_at.unwrap_or_else(Utc::now),
        };
        self.storage.insert_event(stored.clone())?;
        debug!(
            kind = %stored.kind,
            holder = %stored.holder_id,
            vehicle = %stored.vehicle_id,
            "trip event appended"
        );
        Ok(stored)
    }

    /// All events in append order.
    pub fn list_all(&self) -> Result<Vec<TripEvent>> {
        self.storage.list_events()
    }
}
