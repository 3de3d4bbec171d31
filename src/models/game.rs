use crate::geo::{Coordinates, GeoRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Game status, derived from accepted-player count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Open,
    Full,
}

impl GameStatus {
    /// Pure derivation: full iff the accepted count reaches players_needed.
    /// Status is never toggled independently of this function.
    pub fn derive(accepted_count: usize, players_needed: u32) -> Self {
        if accepted_count >= players_needed as usize {
            GameStatus::Full
        } else {
            GameStatus::Open
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::Open => "open",
            GameStatus::Full => "full",
        }
    }
}

/// Where the game happens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
    pub address: String,
}

impl Location {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lng)
    }
}

/// A player on the accepted roster
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcceptedPlayer {
    pub user_id: Uuid,
    pub user_name: String,
    pub accepted_at: DateTime<Utc>,
}

/// A pending join request awaiting the creator's decision
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRequest {
    pub user_id: Uuid,
    pub user_name: String,
    pub requested_at: DateTime<Utc>,
}

/// Game model: a recruitment post for a sport session, bound 1:1 to a Group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub id: Uuid,
    pub creator_id: Uuid,
    pub creator_name: String,
    pub sport: String,
    pub players_needed: u32,
    pub location: Location,
    pub description: String,
    pub scheduled_at: Option<DateTime<Utc>>,
    /// Ordered, unique by user_id, disjoint from pending_requests
    pub accepted_players: Vec<AcceptedPlayer>,
    /// Ordered, unique by user_id, disjoint from accepted_players
    pub pending_requests: Vec<JoinRequest>,
    pub status: GameStatus,
    /// The chat group created with this game
    pub group_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Game {
    pub fn accepted_count(&self) -> usize {
        self.accepted_players.len()
    }

    pub fn is_accepted(&self, user_id: Uuid) -> bool {
        self.accepted_players.iter().any(|p| p.user_id == user_id)
    }

    pub fn has_pending_request(&self, user_id: Uuid) -> bool {
        self.pending_requests.iter().any(|r| r.user_id == user_id)
    }

    /// Re-derive status from current counts. Called after every
    /// accepted-membership mutation, unconditionally.
    pub fn recompute_status(&mut self) {
        self.status = GameStatus::derive(self.accepted_players.len(), self.players_needed);
    }
}

impl GeoRecord for Game {
    fn coordinates(&self) -> Coordinates {
        self.location.coordinates()
    }

    fn matches_category(&self, category: &str) -> bool {
        self.sport.eq_ignore_ascii_case(category)
    }
}
