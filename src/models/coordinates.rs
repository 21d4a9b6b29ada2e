use crate::constants::EARTH_RADIUS_M;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Result<Self, String> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(format!(
                "Invalid latitude: {} (must be between -90 and 90)",
                lat
            ));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(format!(
                "Invalid longitude: {} (must be between -180 and 180)",
                lon
            ));
        }
        Ok(Coordinates { lat, lon })
    }

    /// Great-circle distance to `other` using the haversine formula.
    /// Returns distance in meters
    pub fn distance_m(&self, other: &Coordinates) -> f64 {
        haversine_distance_m(self.lat, self.lon, other.lat, other.lon)
    }
}

/// Haversine distance between two (lat, lon) pairs, in meters.
pub fn haversine_distance_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}
