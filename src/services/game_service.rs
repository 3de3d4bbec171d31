use crate::error::{AppError, AppResult};
use crate::locks::LockRegistry;
use crate::models::{
    AcceptedPlayer, Game, Group, GroupMember, JoinRequest, Location, NotificationKind,
};
use crate::repositories::{GameRepository, GroupRepository, UserRepository};
use crate::services::membership;
use crate::services::Notifier;
use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Input for creating a game post
pub struct NewGame {
    pub sport: String,
    pub players_needed: u32,
    pub location: Location,
    pub description: String,
    pub scheduled_at: Option<DateTime<Utc>>,
}

/// Service driving the game post lifecycle.
///
/// Every mutation validates through the membership policy, updates the game
/// record, and mirrors the accepted roster into the bound group within the
/// same operation, under the game's record lock.
pub struct GameService {
    games: Arc<GameRepository>,
    groups: Arc<GroupRepository>,
    users: Arc<UserRepository>,
    notifier: Arc<Notifier>,
    game_locks: Arc<LockRegistry>,
    user_locks: Arc<LockRegistry>,
}

impl GameService {
    pub fn new(
        games: Arc<GameRepository>,
        groups: Arc<GroupRepository>,
        users: Arc<UserRepository>,
        notifier: Arc<Notifier>,
        game_locks: Arc<LockRegistry>,
    ) -> Self {
        Self {
            games,
            groups,
            users,
            notifier,
            game_locks,
            user_locks: Arc::new(LockRegistry::new()),
        }
    }

    /// Create a game with its bound group. The creator is auto-accepted as
    /// the first player, which can fill the game outright when
    /// players_needed is 1.
    pub async fn create_game(&self, creator_id: Uuid, input: NewGame) -> AppResult<(Game, Group)> {
        if input.players_needed < 1 {
            return Err(AppError::Validation(
                "players_needed must be at least 1".to_string(),
            ));
        }
        input.location.coordinates().validate()?;

        let mut creator = self
            .users
            .find_by_id(creator_id)
            .await
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let now = Utc::now();
        let game_id = Uuid::new_v4();
        let group_id = Uuid::new_v4();

        let place = if input.location.address.is_empty() {
            "location".to_string()
        } else {
            input.location.address.clone()
        };

        let mut game = Game {
            id: game_id,
            creator_id,
            creator_name: creator.name.clone(),
            sport: input.sport,
            players_needed: input.players_needed,
            location: input.location,
            description: input.description,
            scheduled_at: input.scheduled_at,
            accepted_players: vec![AcceptedPlayer {
                user_id: creator_id,
                user_name: creator.name.clone(),
                accepted_at: now,
            }],
            pending_requests: vec![],
            status: crate::models::GameStatus::Open,
            group_id,
            created_at: now,
        };
        game.recompute_status();

        let group = Group {
            id: group_id,
            game_id,
            name: format!("{} at {}", game.sport, place),
            owner_id: creator_id,
            owner_name: creator.name.clone(),
            members: vec![],
            booking: None,
            expires_at: None,
            created_at: now,
        };

        self.games.insert(game.clone()).await?;
        self.groups.insert(group.clone()).await?;

        creator.stats.games_organized += 1;
        creator.stats.games_played += 1;
        self.users.update(creator).await?;

        info!("Created game {} ({}) with group {}", game.sport, game.id, group.id);
        Ok((game, group))
    }

    /// Directly join a game (no approval needed)
    pub async fn join(&self, game_id: Uuid, user_id: Uuid) -> AppResult<Game> {
        let _game_guard = self.game_locks.acquire(game_id).await;

        let mut user = self
            .users
            .find_by_id(user_id)
            .await
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        let mut game = self.fetch_game(game_id).await?;

        membership::ensure_has_capacity(&game)?;
        membership::ensure_not_accepted(&game, user_id)?;

        // The cap check is read-then-decide; hold the user's lock so two
        // concurrent joins cannot both observe a count below the cap.
        let _user_guard = self.user_locks.acquire(user_id).await;
        let active = self.groups.count_for_user(user_id).await;
        membership::ensure_under_group_cap(active)?;

        game.accepted_players.push(AcceptedPlayer {
            user_id,
            user_name: user.name.clone(),
            accepted_at: Utc::now(),
        });
        game.recompute_status();
        self.games.update(game.clone()).await?;
        self.mirror_member_added(&game, user_id, &user.name).await?;

        self.notifier
            .notify(
                game.creator_id,
                NotificationKind::PlayerJoined,
                "New Player Joined!",
                format!(
                    "{} joined your {} game ({}/{} players)",
                    user.name,
                    game.sport,
                    game.accepted_count(),
                    game.players_needed
                ),
                json!({ "game_id": game.id, "group_id": game.group_id }),
            )
            .await;
        self.notifier
            .notify(
                user_id,
                NotificationKind::JoinedGame,
                "Successfully Joined!",
                format!(
                    "You joined {}'s {} game. Check the chat!",
                    game.creator_name, game.sport
                ),
                json!({ "game_id": game.id, "group_id": game.group_id }),
            )
            .await;

        user.stats.games_played += 1;
        self.users.update(user).await?;

        Ok(game)
    }

    /// Queue a join request for the creator to decide on
    pub async fn request_join(&self, game_id: Uuid, user_id: Uuid) -> AppResult<Game> {
        let _game_guard = self.game_locks.acquire(game_id).await;

        let user = self
            .users
            .find_by_id(user_id)
            .await
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        let mut game = self.fetch_game(game_id).await?;

        membership::ensure_not_accepted(&game, user_id)?;
        membership::ensure_not_pending(&game, user_id)?;

        game.pending_requests.push(JoinRequest {
            user_id,
            user_name: user.name.clone(),
            requested_at: Utc::now(),
        });
        self.games.update(game.clone()).await?;

        self.notifier
            .notify(
                game.creator_id,
                NotificationKind::JoinRequested,
                "New Join Request",
                format!("{} asked to join your {} game", user.name, game.sport),
                json!({ "game_id": game.id }),
            )
            .await;

        Ok(game)
    }

    /// Accept a pending request (creator only)
    pub async fn accept(&self, game_id: Uuid, owner_id: Uuid, player_id: Uuid) -> AppResult<Game> {
        let _game_guard = self.game_locks.acquire(game_id).await;

        let mut game = self.fetch_game(game_id).await?;
        membership::ensure_creator(&game, owner_id)?;

        let idx = game
            .pending_requests
            .iter()
            .position(|r| r.user_id == player_id)
            .ok_or_else(|| AppError::NotFound("No pending request from this user".to_string()))?;

        membership::ensure_has_capacity(&game)?;

        let _user_guard = self.user_locks.acquire(player_id).await;
        let active = self.groups.count_for_user(player_id).await;
        membership::ensure_under_group_cap(active)?;

        let request = game.pending_requests.remove(idx);
        game.accepted_players.push(AcceptedPlayer {
            user_id: request.user_id,
            user_name: request.user_name.clone(),
            accepted_at: Utc::now(),
        });
        game.recompute_status();
        self.games.update(game.clone()).await?;
        self.mirror_member_added(&game, request.user_id, &request.user_name)
            .await?;

        self.notifier
            .notify(
                player_id,
                NotificationKind::RequestAccepted,
                "Request Accepted!",
                format!(
                    "You have been accepted to join {}'s {} game",
                    game.creator_name, game.sport
                ),
                json!({ "game_id": game.id, "group_id": game.group_id }),
            )
            .await;

        if let Some(mut player) = self.users.find_by_id(player_id).await {
            player.stats.games_played += 1;
            self.users.update(player).await?;
        }

        Ok(game)
    }

    /// Deny a pending request, or force-remove an accepted player
    /// (creator only)
    pub async fn deny(&self, game_id: Uuid, owner_id: Uuid, player_id: Uuid) -> AppResult<Game> {
        let _game_guard = self.game_locks.acquire(game_id).await;

        let mut game = self.fetch_game(game_id).await?;
        membership::ensure_creator(&game, owner_id)?;

        if let Some(idx) = game
            .pending_requests
            .iter()
            .position(|r| r.user_id == player_id)
        {
            game.pending_requests.remove(idx);
            self.games.update(game.clone()).await?;

            self.notifier
                .notify(
                    player_id,
                    NotificationKind::RequestDenied,
                    "Request Declined",
                    format!(
                        "Your request to join {}'s {} game was declined",
                        game.creator_name, game.sport
                    ),
                    json!({ "game_id": game.id }),
                )
                .await;
            return Ok(game);
        }

        if !game.is_accepted(player_id) {
            return Err(AppError::NotFound(
                "Player not found in this game".to_string(),
            ));
        }
        self.remove_accepted_player(&mut game, player_id).await?;

        self.notifier
            .notify(
                player_id,
                NotificationKind::RemovedFromGame,
                "Removed from Game",
                format!(
                    "You were removed from {}'s {} game",
                    game.creator_name, game.sport
                ),
                json!({ "game_id": game.id }),
            )
            .await;

        Ok(game)
    }

    /// Leave a game. The creator cannot leave their own game; deleting it is
    /// the supported path (keeps the game/group binding intact).
    pub async fn leave(&self, game_id: Uuid, user_id: Uuid) -> AppResult<Game> {
        let _game_guard = self.game_locks.acquire(game_id).await;

        let mut game = self.fetch_game(game_id).await?;
        if game.creator_id == user_id {
            return Err(AppError::Forbidden(
                "The creator cannot leave; delete the game instead".to_string(),
            ));
        }
        if !game.is_accepted(user_id) {
            return Err(AppError::Conflict("You are not in this game".to_string()));
        }

        let removed = self.remove_accepted_player(&mut game, user_id).await?;

        self.notifier
            .notify(
                game.creator_id,
                NotificationKind::PlayerLeft,
                "Player Left",
                format!(
                    "{} left your {} game ({}/{} players)",
                    removed.user_name,
                    game.sport,
                    game.accepted_count(),
                    game.players_needed
                ),
                json!({ "game_id": game.id }),
            )
            .await;

        if let Some(mut user) = self.users.find_by_id(user_id).await {
            user.stats.games_played = user.stats.games_played.saturating_sub(1);
            self.users.update(user).await?;
        }

        Ok(game)
    }

    /// Kick a player (creator only); same removal semantics as leave but
    /// the removed player is the one notified
    pub async fn kick(&self, game_id: Uuid, creator_id: Uuid, player_id: Uuid) -> AppResult<Game> {
        let _game_guard = self.game_locks.acquire(game_id).await;

        let mut game = self.fetch_game(game_id).await?;
        membership::ensure_creator(&game, creator_id)?;
        if player_id == creator_id {
            return Err(AppError::Validation(
                "The creator cannot kick themselves; delete the game instead".to_string(),
            ));
        }
        if !game.is_accepted(player_id) {
            return Err(AppError::NotFound("Player not in this game".to_string()));
        }

        self.remove_accepted_player(&mut game, player_id).await?;

        self.notifier
            .notify(
                player_id,
                NotificationKind::KickedFromGame,
                "Removed from Game",
                format!(
                    "You were removed from {}'s {} game",
                    game.creator_name, game.sport
                ),
                json!({ "game_id": game.id }),
            )
            .await;

        Ok(game)
    }

    /// Delete a game (creator only); cascades to the bound group and
    /// notifies every other accepted player
    pub async fn delete_game(&self, game_id: Uuid, creator_id: Uuid) -> AppResult<()> {
        let _game_guard = self.game_locks.acquire(game_id).await;

        let game = self.fetch_game(game_id).await?;
        membership::ensure_creator(&game, creator_id)?;

        for player in &game.accepted_players {
            if player.user_id == creator_id {
                continue;
            }
            self.notifier
                .notify(
                    player.user_id,
                    NotificationKind::GameCancelled,
                    "Game Cancelled",
                    format!(
                        "{}'s {} game has been cancelled",
                        game.creator_name, game.sport
                    ),
                    json!({ "game_id": game.id }),
                )
                .await;
        }

        self.groups.delete(game.group_id).await;
        self.games.delete(game_id).await;
        info!("Deleted game {} and group {}", game_id, game.group_id);

        drop(_game_guard);
        self.game_locks.discard(game_id);
        Ok(())
    }

    pub async fn get_game(&self, game_id: Uuid) -> AppResult<Game> {
        self.fetch_game(game_id).await
    }

    /// Games created by a user, newest first
    pub async fn games_for_user(&self, user_id: Uuid) -> Vec<Game> {
        self.games.find_by_creator(user_id).await
    }

    async fn fetch_game(&self, game_id: Uuid) -> AppResult<Game> {
        self.games
            .find_by_id(game_id)
            .await
            .ok_or_else(|| AppError::NotFound("Game not found".to_string()))
    }

    /// Mirror an accepted-roster addition into the bound group. A missing
    /// group is a broken game/group binding, surfaced rather than patched.
    async fn mirror_member_added(&self, game: &Game, user_id: Uuid, user_name: &str) -> AppResult<()> {
        let mut group = self
            .groups
            .find_by_id(game.group_id)
            .await
            .ok_or_else(|| {
                AppError::Message(format!("Group {} missing for game {}", game.group_id, game.id))
            })?;
        if group.owner_id == user_id || group.is_member(user_id) {
            return Ok(());
        }
        group.members.push(GroupMember {
            user_id,
            user_name: user_name.to_string(),
        });
        self.groups.update(group).await?;
        Ok(())
    }

    /// Remove a player from the accepted roster, recompute status, and
    /// mirror the removal into the bound group
    async fn remove_accepted_player(
        &self,
        game: &mut Game,
        user_id: Uuid,
    ) -> AppResult<AcceptedPlayer> {
        let idx = game
            .accepted_players
            .iter()
            .position(|p| p.user_id == user_id)
            .ok_or_else(|| AppError::NotFound("Player not in this game".to_string()))?;
        let removed = game.accepted_players.remove(idx);
        game.recompute_status();
        self.games.update(game.clone()).await?;

        let mut group = self
            .groups
            .find_by_id(game.group_id)
            .await
            .ok_or_else(|| {
                AppError::Message(format!("Group {} missing for game {}", game.group_id, game.id))
            })?;
        group.remove_member(user_id);
        self.groups.update(group).await?;

        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GameStatus, User};
    use crate::repositories::NotificationRepository;

    struct Fixture {
        service: GameService,
        games: Arc<GameRepository>,
        groups: Arc<GroupRepository>,
        users: Arc<UserRepository>,
        notifications: Arc<NotificationRepository>,
    }

    fn fixture() -> Fixture {
        let games = Arc::new(GameRepository::new());
        let groups = Arc::new(GroupRepository::new());
        let users = Arc::new(UserRepository::new());
        let notifications = Arc::new(NotificationRepository::new());
        let notifier = Arc::new(Notifier::new(notifications.clone()));
        let service = GameService::new(
            games.clone(),
            groups.clone(),
            users.clone(),
            notifier,
            Arc::new(LockRegistry::new()),
        );
        Fixture {
            service,
            games,
            groups,
            users,
            notifications,
        }
    }

    async fn seed_user(users: &UserRepository, name: &str) -> User {
        let user = User::new(name, format!("{}@example.com", name), format!("+91-{}", name));
        users.insert(user.clone()).await.unwrap();
        user
    }

    fn new_game(players_needed: u32) -> NewGame {
        NewGame {
            sport: "football".to_string(),
            players_needed,
            location: Location {
                lat: 12.97,
                lng: 77.59,
                address: "the park".to_string(),
            },
            description: "friendly".to_string(),
            scheduled_at: None,
        }
    }

    /// Group.members must equal the game's accepted roster minus the owner
    async fn assert_mirrored(fx: &Fixture, game_id: Uuid) {
        let game = fx.games.find_by_id(game_id).await.unwrap();
        let group = fx.groups.find_by_id(game.group_id).await.unwrap();

        let expected: Vec<Uuid> = game
            .accepted_players
            .iter()
            .filter(|p| p.user_id != group.owner_id)
            .map(|p| p.user_id)
            .collect();
        let actual: Vec<Uuid> = group.members.iter().map(|m| m.user_id).collect();
        assert_eq!(expected, actual, "group members drifted from accepted roster");
    }

    #[tokio::test]
    async fn test_create_auto_accepts_creator() {
        let fx = fixture();
        let creator = seed_user(&fx.users, "asha").await;

        let (game, group) = fx.service.create_game(creator.id, new_game(2)).await.unwrap();

        assert_eq!(game.status, GameStatus::Open);
        assert_eq!(game.accepted_players.len(), 1);
        assert_eq!(game.accepted_players[0].user_id, creator.id);
        assert_eq!(group.owner_id, creator.id);
        assert!(group.members.is_empty());
        assert_eq!(group.game_id, game.id);

        let stored = fx.users.find_by_id(creator.id).await.unwrap();
        assert_eq!(stored.stats.games_organized, 1);
        assert_eq!(stored.stats.games_played, 1);
    }

    #[tokio::test]
    async fn test_create_single_spot_is_immediately_full() {
        let fx = fixture();
        let creator = seed_user(&fx.users, "asha").await;

        let (game, _) = fx.service.create_game(creator.id, new_game(1)).await.unwrap();
        assert_eq!(game.status, GameStatus::Full);
    }

    #[tokio::test]
    async fn test_create_rejects_zero_spots() {
        let fx = fixture();
        let creator = seed_user(&fx.users, "asha").await;

        let err = fx.service.create_game(creator.id, new_game(0)).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_bad_coordinates() {
        let fx = fixture();
        let creator = seed_user(&fx.users, "asha").await;

        let mut input = new_game(2);
        input.location.lat = 120.0;
        let err = fx.service.create_game(creator.id, input).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_join_leave_round_trip() {
        let fx = fixture();
        let creator = seed_user(&fx.users, "asha").await;
        let joiner = seed_user(&fx.users, "ben").await;

        let (game, _) = fx.service.create_game(creator.id, new_game(2)).await.unwrap();

        let joined = fx.service.join(game.id, joiner.id).await.unwrap();
        assert_eq!(joined.status, GameStatus::Full);
        assert_eq!(joined.accepted_players.len(), 2);
        assert_mirrored(&fx, game.id).await;

        let left = fx.service.leave(game.id, joiner.id).await.unwrap();
        assert_eq!(left.status, GameStatus::Open);
        assert_eq!(left.accepted_players.len(), 1);
        assert_mirrored(&fx, game.id).await;

        let group = fx.groups.find_by_id(game.group_id).await.unwrap();
        assert!(group.members.is_empty());
    }

    #[tokio::test]
    async fn test_join_full_game_conflicts() {
        let fx = fixture();
        let creator = seed_user(&fx.users, "asha").await;
        let late = seed_user(&fx.users, "cara").await;

        let (game, _) = fx.service.create_game(creator.id, new_game(1)).await.unwrap();

        let err = fx.service.join(game.id, late.id).await.unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_double_join_conflicts() {
        let fx = fixture();
        let creator = seed_user(&fx.users, "asha").await;
        let joiner = seed_user(&fx.users, "ben").await;

        let (game, _) = fx.service.create_game(creator.id, new_game(3)).await.unwrap();
        fx.service.join(game.id, joiner.id).await.unwrap();

        let err = fx.service.join(game.id, joiner.id).await.unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_active_group_cap_enforced_then_released() {
        let fx = fixture();
        let joiner = seed_user(&fx.users, "ben").await;

        let mut game_ids = Vec::new();
        for i in 0..4 {
            let creator = seed_user(&fx.users, &format!("host-{}", i)).await;
            let (game, _) = fx.service.create_game(creator.id, new_game(5)).await.unwrap();
            game_ids.push(game.id);
        }

        for game_id in &game_ids[..3] {
            fx.service.join(*game_id, joiner.id).await.unwrap();
        }

        // fourth join hits the cap
        let err = fx.service.join(game_ids[3], joiner.id).await.unwrap_err();
        assert!(err.is_conflict());

        // leaving one frees a slot
        fx.service.leave(game_ids[0], joiner.id).await.unwrap();
        fx.service.join(game_ids[3], joiner.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_request_accept_flow() {
        let fx = fixture();
        let creator = seed_user(&fx.users, "asha").await;
        let applicant = seed_user(&fx.users, "ben").await;

        let (game, _) = fx.service.create_game(creator.id, new_game(2)).await.unwrap();

        let pending = fx.service.request_join(game.id, applicant.id).await.unwrap();
        assert_eq!(pending.pending_requests.len(), 1);
        assert!(pending.accepted_players.iter().all(|p| p.user_id != applicant.id));

        let accepted = fx
            .service
            .accept(game.id, creator.id, applicant.id)
            .await
            .unwrap();
        assert!(accepted.pending_requests.is_empty());
        assert!(accepted.is_accepted(applicant.id));
        assert_eq!(accepted.status, GameStatus::Full);
        assert_mirrored(&fx, game.id).await;
    }

    #[tokio::test]
    async fn test_accept_requires_creator_and_pending_request() {
        let fx = fixture();
        let creator = seed_user(&fx.users, "asha").await;
        let applicant = seed_user(&fx.users, "ben").await;
        let stranger = seed_user(&fx.users, "cara").await;

        let (game, _) = fx.service.create_game(creator.id, new_game(3)).await.unwrap();
        fx.service.request_join(game.id, applicant.id).await.unwrap();

        let err = fx
            .service
            .accept(game.id, stranger.id, applicant.id)
            .await
            .unwrap_err();
        assert!(err.is_forbidden());

        let err = fx
            .service
            .accept(game.id, creator.id, stranger.id)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_duplicate_request_conflicts() {
        let fx = fixture();
        let creator = seed_user(&fx.users, "asha").await;
        let applicant = seed_user(&fx.users, "ben").await;

        let (game, _) = fx.service.create_game(creator.id, new_game(3)).await.unwrap();
        fx.service.request_join(game.id, applicant.id).await.unwrap();

        let err = fx
            .service
            .request_join(game.id, applicant.id)
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_deny_pending_request() {
        let fx = fixture();
        let creator = seed_user(&fx.users, "asha").await;
        let applicant = seed_user(&fx.users, "ben").await;

        let (game, _) = fx.service.create_game(creator.id, new_game(3)).await.unwrap();
        fx.service.request_join(game.id, applicant.id).await.unwrap();

        let denied = fx.service.deny(game.id, creator.id, applicant.id).await.unwrap();
        assert!(denied.pending_requests.is_empty());
        assert!(!denied.is_accepted(applicant.id));
    }

    #[tokio::test]
    async fn test_deny_accepted_player_reopens_and_mirrors() {
        let fx = fixture();
        let creator = seed_user(&fx.users, "asha").await;
        let joiner = seed_user(&fx.users, "ben").await;

        let (game, _) = fx.service.create_game(creator.id, new_game(2)).await.unwrap();
        fx.service.join(game.id, joiner.id).await.unwrap();

        let denied = fx.service.deny(game.id, creator.id, joiner.id).await.unwrap();
        assert_eq!(denied.status, GameStatus::Open);
        assert!(!denied.is_accepted(joiner.id));
        assert_mirrored(&fx, game.id).await;
    }

    #[tokio::test]
    async fn test_kick_requires_creator_and_mirrors() {
        let fx = fixture();
        let creator = seed_user(&fx.users, "asha").await;
        let joiner = seed_user(&fx.users, "ben").await;

        let (game, _) = fx.service.create_game(creator.id, new_game(2)).await.unwrap();
        fx.service.join(game.id, joiner.id).await.unwrap();

        let err = fx
            .service
            .kick(game.id, joiner.id, creator.id)
            .await
            .unwrap_err();
        assert!(err.is_forbidden());

        let kicked = fx.service.kick(game.id, creator.id, joiner.id).await.unwrap();
        assert_eq!(kicked.status, GameStatus::Open);
        assert_mirrored(&fx, game.id).await;

        // kicked player was notified
        let inbox = fx.notifications.find_for_user(joiner.id, false).await;
        assert!(inbox
            .iter()
            .any(|n| n.kind == NotificationKind::KickedFromGame));
    }

    #[tokio::test]
    async fn test_creator_cannot_leave_or_self_kick() {
        let fx = fixture();
        let creator = seed_user(&fx.users, "asha").await;

        let (game, _) = fx.service.create_game(creator.id, new_game(2)).await.unwrap();

        assert!(fx
            .service
            .leave(game.id, creator.id)
            .await
            .unwrap_err()
            .is_forbidden());
        assert!(matches!(
            fx.service.kick(game.id, creator.id, creator.id).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_cascades_and_notifies() {
        let fx = fixture();
        let creator = seed_user(&fx.users, "asha").await;
        let joiner = seed_user(&fx.users, "ben").await;

        let (game, group) = fx.service.create_game(creator.id, new_game(2)).await.unwrap();
        fx.service.join(game.id, joiner.id).await.unwrap();

        let err = fx.service.delete_game(game.id, joiner.id).await.unwrap_err();
        assert!(err.is_forbidden());

        fx.service.delete_game(game.id, creator.id).await.unwrap();
        assert!(fx.games.find_by_id(game.id).await.is_none());
        assert!(fx.groups.find_by_id(group.id).await.is_none());

        let inbox = fx.notifications.find_for_user(joiner.id, false).await;
        assert!(inbox.iter().any(|n| n.kind == NotificationKind::GameCancelled));
    }

    #[tokio::test]
    async fn test_concurrent_joins_admit_exactly_one_winner() {
        let fx = fixture();
        let creator = seed_user(&fx.users, "asha").await;
        // one open slot beyond the auto-accepted creator
        let (game, _) = fx.service.create_game(creator.id, new_game(2)).await.unwrap();

        let service = Arc::new(fx.service);
        let mut contenders = Vec::new();
        for i in 0..8 {
            contenders.push(seed_user(&fx.users, &format!("racer-{}", i)).await.id);
        }

        let mut handles = Vec::new();
        for user_id in contenders {
            let service = service.clone();
            let game_id = game.id;
            handles.push(tokio::spawn(
                async move { service.join(game_id, user_id).await },
            ));
        }

        let mut successes = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(e) if e.is_conflict() => conflicts += 1,
                Err(e) => panic!("unexpected error: {}", e),
            }
        }
        assert_eq!(successes, 1);
        assert_eq!(conflicts, 7);

        let stored = fx.games.find_by_id(game.id).await.unwrap();
        assert_eq!(stored.accepted_players.len(), 2);
        assert_eq!(stored.status, GameStatus::Full);
    }

    #[tokio::test]
    async fn test_concurrent_cap_checks_admit_at_most_three() {
        let fx = fixture();
        let joiner = seed_user(&fx.users, "ben").await;

        let mut game_ids = Vec::new();
        for i in 0..6 {
            let creator = seed_user(&fx.users, &format!("host-{}", i)).await;
            let (game, _) = fx.service.create_game(creator.id, new_game(5)).await.unwrap();
            game_ids.push(game.id);
        }

        let service = Arc::new(fx.service);
        let mut handles = Vec::new();
        for game_id in game_ids {
            let service = service.clone();
            let user_id = joiner.id;
            handles.push(tokio::spawn(
                async move { service.join(game_id, user_id).await },
            ));
        }

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                successes += 1;
            }
        }
        assert_eq!(successes, membership::MAX_ACTIVE_GROUPS);
        assert_eq!(fx.groups.count_for_user(joiner.id).await, membership::MAX_ACTIVE_GROUPS);
    }
}
