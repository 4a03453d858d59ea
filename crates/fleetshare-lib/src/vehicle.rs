use serde::{Deserialize, Serialize};

use crate::error::{require_non_empty, Error, Result};
use crate::geo::GeoLocation;

/// Opaque, globally unique vehicle identifier.
pub type VehicleId = String;

/// A shared vehicle and its reservation state.
///
/// `is_available == false` exactly when `holder` is present. Records are owned
/// by the storage backend and only change through its atomic update; callers
/// receive point-in-time clones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    pub name: String,
    pub location: GeoLocation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holder: Option<String>,
    pub is_available: bool,
}

impl Vehicle {
    /// Create an available vehicle with no holder.
    pub fn available(
        id: impl Into<VehicleId>,
        name: impl Into<String>,
        location: GeoLocation,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            location,
            holder: None,
            is_available: true,
        }
    }

    /// Check identifier, coordinates, and the availability/holder invariant.
    pub fn validate(&self) -> Result<()> {
        require_non_empty("vehicle_id", &self.id)?;
        self.location.validate()?;
        match (&self.holder, self.is_available) {
            (None, true) => Ok(()),
            (Some(holder), false) if !holder.trim().is_empty() => Ok(()),
            (Some(_), false) => Err(Error::invalid(
                "holder",
                format!("vehicle {} is reserved by a blank holder", self.id),
            )),
            (Some(_), true) => Err(Error::invalid(
                "holder",
                format!("vehicle {} is available but has a holder", self.id),
            )),
            (None, false) => Err(Error::invalid(
                "holder",
                format!("vehicle {} is unavailable without a holder", self.id),
            )),
        }
    }

    /// Whether `holder_id` currently holds this vehicle.
    pub fn is_held_by(&self, holder_id: &str) -> bool {
        self.holder.as_deref() == Some(holder_id)
    }

    pub(crate) fn reserved_by(&self, holder_id: &str) -> Vehicle {
        Vehicle {
            holder: Some(holder_id.to_string()),
            is_available: false,
            ..self.clone()
        }
    }

    pub(crate) fn released(&self, location: Option<GeoLocation>) -> Vehicle {
        Vehicle {
            holder: None,
            is_available: true,
            location: location.unwrap_or(self.location),
            ..self.clone()
        }
    }
}

/// A person who can hold vehicles. Carried in fleet datasets for simulation
/// and audit; the reservation engine only ever sees the identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rider {
    pub id: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scooter() -> Vehicle {
        Vehicle::available("v-1", "Scooter 1", GeoLocation::new(52.5, 13.4))
    }

    #[test]
    fn test_available_vehicle_is_valid() {
        let vehicle = scooter();
        assert!(vehicle.validate().is_ok());
        assert!(vehicle.holder.is_none());
    }

    #[test]
    fn test_reserved_then_released_restores_state() {
        let vehicle = scooter();
        let reserved = vehicle.reserved_by("rider-1");
        assert!(reserved.validate().is_ok());
        assert!(reserved.is_held_by("rider-1"));
        assert!(!reserved.is_available);

        let released = reserved.released(None);
        assert_eq!(released, vehicle);
    }

    #[test]
    fn test_release_can_move_vehicle() {
        let target = GeoLocation::new(52.6, 13.5);
        let released = scooter().reserved_by("rider-1").released(Some(target));
        assert_eq!(released.location, target);
    }

    #[test]
    fn test_invariant_violations_rejected() {
        let mut vehicle = scooter();
        vehicle.is_available = false;
        assert!(vehicle.validate().is_err());

        let mut vehicle = scooter();
        vehicle.holder = Some("rider-1".to_string());
        assert!(vehicle.validate().is_err());

        let mut vehicle = scooter();
        vehicle.id = String::new();
        assert!(matches!(
            vehicle.validate(),
            Err(Error::EmptyArgument { .. })
        ));
    }

    #[test]
    fn test_serialization_skips_missing_holder() {
        let json = serde_json::to_string(&scooter()).unwrap();
        assert!(json.contains("\"is_available\":true"));
        assert!(!json.contains("holder"));
    }
}
