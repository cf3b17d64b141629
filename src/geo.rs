//! Geodesy helpers
//!
//! WGS84 lat/lon positions and great-circle distance. Distances are computed
//! with the haversine formula on a spherical Earth (R = 6371 km), which is
//! accurate to well under the 50 m movement threshold at North Sea scales.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometres.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// A WGS84 coordinate pair. Invariant: both components are finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lat: f64,
    pub lon: f64,
}

impl Position {
    /// Build a position from optional components, rejecting missing or
    /// non-finite values.
    pub fn from_parts(lat: Option<f64>, lon: Option<f64>) -> Option<Self> {
        match (lat, lon) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => {
                Some(Self { lat, lon })
            }
            _ => None,
        }
    }
}

/// Great-circle distance between two positions in kilometres.
pub fn haversine_km(a: Position, b: Position) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let dphi = (b.lat - a.lat).to_radians();
    let dlambda = (b.lon - a.lon).to_radians();

    let h = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Great-circle distance between two positions in metres.
pub fn haversine_m(a: Position, b: Position) -> f64 {
    haversine_km(a, b) * 1000.0
}
