use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Rating model: one player's post-game review of another.
/// Unique per (game, rater, rated); facet scores share the [1,5] range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rating {
    pub id: Uuid,
    pub game_id: Uuid,
    pub rater_id: Uuid,
    pub rater_name: String,
    pub rated_user_id: Uuid,
    pub rated_user_name: String,
    pub overall: u8,
    pub punctuality: u8,
    pub skill: u8,
    pub teamwork: u8,
    pub sportsmanship: u8,
    pub review: String,
    pub created_at: DateTime<Utc>,
}
