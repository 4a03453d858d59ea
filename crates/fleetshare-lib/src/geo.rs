//! Geographic value types and great-circle distance helpers.
//!
//! Distances use a spherical Earth model with the mean radius; sub-meter
//! precision is not a goal. The same model backs the proximity index, which
//! works on Earth-centred Cartesian coordinates so that straight-line (chord)
//! distance orders points exactly like great-circle distance does.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Mean Earth radius in meters (IUGG).
pub const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

/// A WGS84 latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoLocation {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check that both coordinates are finite and inside their ranges.
    pub fn validate(&self) -> Result<()> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(Error::invalid(
                "latitude",
                format!("{} is outside [-90, 90]", self.latitude),
            ));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(Error::invalid(
                "longitude",
                format!("{} is outside [-180, 180]", self.longitude),
            ));
        }
        Ok(())
    }

    /// Great-circle (haversine) distance to another location, in meters.
    pub fn distance_to(&self, other: &GeoLocation) -> f64 {
        let (lat1, lon1) = (self.latitude.to_radians(), self.longitude.to_radians());
        let (lat2, lon2) = (other.latitude.to_radians(), other.longitude.to_radians());
        let sin_dlat = ((lat2 - lat1) * 0.5).sin();
        let sin_dlon = ((lon2 - lon1) * 0.5).sin();
        let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
        let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
        EARTH_RADIUS_METERS * c
    }

    /// Move `meters` due north, clamping at the pole.
    pub fn offset_north(&self, meters: f64) -> GeoLocation {
        let delta = (meters / EARTH_RADIUS_METERS).to_degrees();
        GeoLocation {
            latitude: (self.latitude + delta).clamp(-90.0, 90.0),
            longitude: self.longitude,
        }
    }

    /// Move `meters` due east along the current parallel.
    pub fn offset_east(&self, meters: f64) -> GeoLocation {
        let parallel_radius = EARTH_RADIUS_METERS * self.latitude.to_radians().cos();
        if parallel_radius <= f64::EPSILON {
            return *self;
        }
        let mut longitude = self.longitude + (meters / parallel_radius).to_degrees();
        if longitude > 180.0 {
            longitude -= 360.0;
        } else if longitude < -180.0 {
            longitude += 360.0;
        }
        GeoLocation {
            latitude: self.latitude,
            longitude,
        }
    }

    /// Earth-centred Cartesian coordinates on the sphere, in meters.
    pub(crate) fn to_cartesian(self) -> [f64; 3] {
        let lat = self.latitude.to_radians();
        let lon = self.longitude.to_radians();
        [
            EARTH_RADIUS_METERS * lat.cos() * lon.cos(),
            EARTH_RADIUS_METERS * lat.cos() * lon.sin(),
            EARTH_RADIUS_METERS * lat.sin(),
        ]
    }
}

/// Straight-line chord length subtending a great-circle arc of `arc_meters`.
pub(crate) fn chord_for_arc(arc_meters: f64) -> f64 {
    let angle = (arc_meters / EARTH_RADIUS_METERS).min(std::f64::consts::PI);
    2.0 * EARTH_RADIUS_METERS * (angle * 0.5).sin()
}
