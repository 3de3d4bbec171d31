//! Membership policy: the pure eligibility rules consulted by the game and
//! group lifecycles. No state, no side effects.

use crate::error::{AppError, AppResult};
use crate::models::Game;
use uuid::Uuid;

/// Maximum number of groups a user may belong to at once
pub const MAX_ACTIVE_GROUPS: usize = 3;

/// A full game admits no more accepted players
pub fn ensure_has_capacity(game: &Game) -> AppResult<()> {
    if game.accepted_count() >= game.players_needed as usize {
        return Err(AppError::Conflict(
            "This game is already full. No spots available!".to_string(),
        ));
    }
    Ok(())
}

/// Accepted players are unique by user id
pub fn ensure_not_accepted(game: &Game, user_id: Uuid) -> AppResult<()> {
    if game.is_accepted(user_id) {
        return Err(AppError::Conflict(
            "You have already joined this game".to_string(),
        ));
    }
    Ok(())
}

/// Pending requests are unique by user id
pub fn ensure_not_pending(game: &Game, user_id: Uuid) -> AppResult<()> {
    if game.has_pending_request(user_id) {
        return Err(AppError::Conflict(
            "You already have a pending request for this game".to_string(),
        ));
    }
    Ok(())
}

/// The active-group cap, checked at join/accept time only
pub fn ensure_under_group_cap(active_groups: usize) -> AppResult<()> {
    if active_groups >= MAX_ACTIVE_GROUPS {
        return Err(AppError::Conflict(format!(
            "Maximum of {} active groups reached",
            MAX_ACTIVE_GROUPS
        )));
    }
    Ok(())
}

/// Only the game's creator may perform privileged actions
pub fn ensure_creator(game: &Game, user_id: Uuid) -> AppResult<()> {
    if game.creator_id != user_id {
        return Err(AppError::Forbidden(
            "Only the game creator may do this".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AcceptedPlayer, GameStatus, Location};
    use chrono::Utc;

    fn game_with_accepted(players_needed: u32, accepted: usize) -> Game {
        let players = (0..accepted)
            .map(|i| AcceptedPlayer {
                user_id: Uuid::new_v4(),
                user_name: format!("player-{}", i),
                accepted_at: Utc::now(),
            })
            .collect();
        Game {
            id: Uuid::new_v4(),
            creator_id: Uuid::new_v4(),
            creator_name: "Asha".to_string(),
            sport: "football".to_string(),
            players_needed,
            location: Location {
                lat: 0.0,
                lng: 0.0,
                address: String::new(),
            },
            description: String::new(),
            scheduled_at: None,
            accepted_players: players,
            pending_requests: vec![],
            status: GameStatus::derive(accepted, players_needed),
            group_id: Uuid::new_v4(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_capacity_check() {
        assert!(ensure_has_capacity(&game_with_accepted(2, 1)).is_ok());

        let err = ensure_has_capacity(&game_with_accepted(2, 2)).unwrap_err();
        assert!(err.is_conflict());
    }

    #[test]
    fn test_duplicate_membership_check() {
        let game = game_with_accepted(4, 2);
        let member = game.accepted_players[0].user_id;

        assert!(ensure_not_accepted(&game, member).unwrap_err().is_conflict());
        assert!(ensure_not_accepted(&game, Uuid::new_v4()).is_ok());
    }

    #[test]
    fn test_group_cap() {
        assert!(ensure_under_group_cap(0).is_ok());
        assert!(ensure_under_group_cap(MAX_ACTIVE_GROUPS - 1).is_ok());
        assert!(ensure_under_group_cap(MAX_ACTIVE_GROUPS)
            .unwrap_err()
            .is_conflict());
        assert!(ensure_under_group_cap(MAX_ACTIVE_GROUPS + 1)
            .unwrap_err()
            .is_conflict());
    }

    #[test]
    fn test_creator_check() {
        let game = game_with_accepted(4, 0);
        assert!(ensure_creator(&game, game.creator_id).is_ok());
        assert!(ensure_creator(&game, Uuid::new_v4())
            .unwrap_err()
            .is_forbidden());
    }
}
