use crate::geo::{Coordinates, GeoRecord};
use crate::models::Location;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Turf model: a bookable sports venue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turf {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub owner_name: String,
    pub name: String,
    pub location: Location,
    /// Sports playable at this venue, e.g. ["cricket", "football"]
    pub sports: Vec<String>,
    pub price_per_hour: f64,
    pub created_at: DateTime<Utc>,
}

impl GeoRecord for Turf {
    fn coordinates(&self) -> Coordinates {
        self.location.coordinates()
    }

    fn matches_category(&self, category: &str) -> bool {
        self.sports.iter().any(|s| s.eq_ignore_ascii_case(category))
    }
}
