use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Rolling participation and rating stats for a player
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerStats {
    pub games_played: u32,
    pub games_organized: u32,
    pub average_rating: f64,
    pub total_ratings: u32,
}

/// User model. Registration/auth live outside this service; the core only
/// needs identity, contact lookups, and stats.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub stats: PlayerStats,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: impl Into<String>, email: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
            stats: PlayerStats::default(),
            created_at: Utc::now(),
        }
    }
}
