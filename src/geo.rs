//! Great-circle distance and proximity search over located records.
//!
//! Used by the read-only discovery queries (nearby games, nearby turfs, and
//! nearby games annotated with turfs). No side effects; results are
//! deterministic for fixed inputs.

use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A point in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Reject non-finite or out-of-range coordinates
    pub fn validate(&self) -> AppResult<()> {
        if !self.lat.is_finite() || !self.lng.is_finite() {
            return Err(AppError::Validation(
                "Location must include numeric lat and lng".to_string(),
            ));
        }
        if self.lat < -90.0 || self.lat > 90.0 {
            return Err(AppError::Validation(format!(
                "Latitude out of range: {}",
                self.lat
            )));
        }
        if self.lng < -180.0 || self.lng > 180.0 {
            return Err(AppError::Validation(format!(
                "Longitude out of range: {}",
                self.lng
            )));
        }
        Ok(())
    }
}

/// Haversine great-circle distance between two points, in kilometers
pub fn haversine_km(from: Coordinates, to: Coordinates) -> f64 {
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lng = (to.lng - from.lng).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + from.lat.to_radians().cos() * to.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Round a distance to two decimals for API responses
pub fn round_km(distance: f64) -> f64 {
    (distance * 100.0).round() / 100.0
}

/// A record that can be placed on the map and filtered by category
pub trait GeoRecord {
    fn coordinates(&self) -> Coordinates;

    /// Case-insensitive category match (a game's sport, a turf's sports list)
    fn matches_category(&self, category: &str) -> bool;
}

/// Filter candidates to those within `radius_km` of `origin` (inclusive
/// boundary) and sort ascending by distance. Ties keep input order.
///
/// If `category` is given, candidates are matched on it before the distance
/// filter is applied.
pub fn nearby<T: GeoRecord>(
    origin: Coordinates,
    candidates: Vec<T>,
    radius_km: f64,
    category: Option<&str>,
) -> Vec<(T, f64)> {
    let mut hits: Vec<(T, f64)> = candidates
        .into_iter()
        .filter(|c| category.map_or(true, |cat| c.matches_category(cat)))
        .filter_map(|c| {
            let distance = haversine_km(origin, c.coordinates());
            (distance <= radius_km).then_some((c, distance))
        })
        .collect();

    // sort_by is stable, so equal distances preserve candidate order
    hits.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
    hits
}
