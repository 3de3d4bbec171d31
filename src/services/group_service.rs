use crate::error::{AppError, AppResult};
use crate::geo;
use crate::locks::LockRegistry;
use crate::models::{Booking, Game, Group, GroupMember, NotificationKind};
use crate::repositories::{GameRepository, GroupRepository};
use crate::services::Notifier;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

/// Two groups must sit within this distance of each other to merge
pub const MERGE_RADIUS_KM: f64 = 5.0;

/// Minimum participant count (owner included) on each side of a merge
pub const MERGE_MIN_SIDE: usize = 9;

/// A completed merge: `absorbed` was folded into `winner`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergedPair {
    pub winner_group_id: Uuid,
    pub absorbed_group_id: Uuid,
}

/// Service driving the group lifecycle: venue booking with its expiry
/// deadline, member removal mirrored into the bound game, the expiry sweep,
/// and compatible-group merging.
///
/// Group-keyed mutations serialize on the bound game's record lock, the same
/// lock the game lifecycle takes, so the two sides of the mirror cannot race.
pub struct GroupService {
    groups: Arc<GroupRepository>,
    games: Arc<GameRepository>,
    notifier: Arc<Notifier>,
    game_locks: Arc<LockRegistry>,
    booking_ttl: Duration,
}

impl GroupService {
    pub fn new(
        groups: Arc<GroupRepository>,
        games: Arc<GameRepository>,
        notifier: Arc<Notifier>,
        game_locks: Arc<LockRegistry>,
        booking_ttl: Duration,
    ) -> Self {
        Self {
            groups,
            games,
            notifier,
            game_locks,
            booking_ttl,
        }
    }

    pub async fn get_group(&self, group_id: Uuid) -> AppResult<Group> {
        self.groups
            .find_by_id(group_id)
            .await
            .ok_or_else(|| AppError::NotFound("Group not found".to_string()))
    }

    /// Groups a user participates in
    pub async fn groups_for_user(&self, user_id: Uuid) -> Vec<Group> {
        self.groups.find_for_user(user_id).await
    }

    /// Book a venue for the group (owner only). Arms the expiry timer:
    /// the group is swept `booking_ttl` after the booking time. Re-booking
    /// overwrites the previous booking and re-arms the timer.
    pub async fn book_turf(
        &self,
        group_id: Uuid,
        user_id: Uuid,
        turf_name: String,
        turf_address: String,
    ) -> AppResult<Group> {
        let group = self.get_group(group_id).await?;
        let _guard = self.game_locks.acquire(group.game_id).await;

        let mut group = self.get_group(group_id).await?;
        if group.owner_id != user_id {
            return Err(AppError::Forbidden(
                "Only the group owner can book a turf".to_string(),
            ));
        }

        let booked_at = Utc::now();
        let expires_at = booked_at + self.booking_ttl;
        group.booking = Some(Booking {
            turf_name,
            turf_address,
            booked_at,
        });
        group.expires_at = Some(expires_at);
        self.groups.update(group.clone()).await?;

        info!("Group {} booked a turf; expires at {}", group.id, expires_at);
        Ok(group)
    }

    /// Leave a group (non-owner members only). The removal is mirrored into
    /// the bound game's accepted roster so the two stay in sync.
    pub async fn leave_group(&self, group_id: Uuid, user_id: Uuid) -> AppResult<Group> {
        let group = self.get_group(group_id).await?;
        let _guard = self.game_locks.acquire(group.game_id).await;

        let mut group = self.get_group(group_id).await?;
        if group.owner_id == user_id {
            return Err(AppError::Forbidden(
                "Group owner cannot leave; the group is removed on game deletion or expiry"
                    .to_string(),
            ));
        }
        let removed = group
            .remove_member(user_id)
            .ok_or_else(|| AppError::NotFound("You are not a member of this group".to_string()))?;
        self.groups.update(group.clone()).await?;

        let mut game = self.games.find_by_id(group.game_id).await.ok_or_else(|| {
            AppError::Message(format!("Game {} missing for group {}", group.game_id, group.id))
        })?;
        if let Some(idx) = game
            .accepted_players
            .iter()
            .position(|p| p.user_id == user_id)
        {
            game.accepted_players.remove(idx);
            game.recompute_status();
            self.games.update(game.clone()).await?;
        }

        self.notifier
            .notify(
                group.owner_id,
                NotificationKind::PlayerLeft,
                "Player Left",
                format!("{} left your group {}", removed.user_name, group.name),
                json!({ "group_id": group.id, "game_id": group.game_id }),
            )
            .await;

        Ok(group)
    }

    /// Delete every booked group whose deadline has passed. Each record is
    /// handled independently; one failure never aborts the rest of the
    /// batch. Returns the number of groups removed.
    ///
    /// The bound game is left in place for the owning system to reconcile.
    pub async fn expire_sweep(&self, now: DateTime<Utc>) -> usize {
        let candidates = self.groups.all().await;
        let mut removed = 0;

        for candidate in candidates {
            if !candidate.is_expired(now) {
                continue;
            }
            let _guard = self.game_locks.acquire(candidate.game_id).await;

            // Re-read under the lock; the group may have been deleted or
            // re-booked since the scan.
            let current = match self.groups.find_by_id(candidate.id).await {
                Some(group) => group,
                None => continue,
            };
            if !current.is_expired(now) {
                continue;
            }

            if self.groups.delete(current.id).await {
                info!("Expired group {} ({})", current.id, current.name);
                removed += 1;
            } else {
                error!("Failed to delete expired group {}", current.id);
            }
        }
        removed
    }

    /// Merge compatible groups pairwise and return the merged pairs.
    ///
    /// Two groups are compatible when neither holds a booking, their bound
    /// games declare the same sport within MERGE_RADIUS_KM of each other,
    /// and both sides count at least MERGE_MIN_SIDE participants. The older
    /// group absorbs the younger; a group takes part in at most one merge
    /// per sweep.
    pub async fn merge_compatible(&self) -> Vec<MergedPair> {
        let snapshot = self.groups.all().await;
        let mut consumed: HashSet<Uuid> = HashSet::new();
        let mut merged = Vec::new();

        for i in 0..snapshot.len() {
            for j in (i + 1)..snapshot.len() {
                let (winner, loser) = (&snapshot[i], &snapshot[j]);
                if consumed.contains(&winner.id) || consumed.contains(&loser.id) {
                    continue;
                }
                if !self.snapshot_compatible(winner, loser).await {
                    continue;
                }

                match self.merge_pair(winner.id, loser.id).await {
                    Ok(Some(pair)) => {
                        consumed.insert(pair.winner_group_id);
                        consumed.insert(pair.absorbed_group_id);
                        merged.push(pair);
                    }
                    Ok(None) => {} // records changed under us; skip quietly
                    Err(e) => error!(
                        "Failed to merge groups {} and {}: {}",
                        winner.id, loser.id, e
                    ),
                }
            }
        }
        merged
    }

    /// Compatibility check against unlocked snapshot records; re-validated
    /// under the pair lock before the merge commits
    async fn snapshot_compatible(&self, a: &Group, b: &Group) -> bool {
        if a.booking.is_some() || b.booking.is_some() {
            return false;
        }
        if a.participant_count() < MERGE_MIN_SIDE || b.participant_count() < MERGE_MIN_SIDE {
            return false;
        }
        let (game_a, game_b) = match (
            self.games.find_by_id(a.game_id).await,
            self.games.find_by_id(b.game_id).await,
        ) {
            (Some(ga), Some(gb)) => (ga, gb),
            _ => return false,
        };
        games_compatible(&game_a, &game_b)
    }

    /// Merge `loser` into `winner` under both game locks. Returns None when
    /// re-validation fails (a record changed between scan and lock).
    async fn merge_pair(&self, winner_id: Uuid, loser_id: Uuid) -> AppResult<Option<MergedPair>> {
        let (winner_game_id, loser_game_id) = match (
            self.groups.find_by_id(winner_id).await,
            self.groups.find_by_id(loser_id).await,
        ) {
            (Some(w), Some(l)) => (w.game_id, l.game_id),
            _ => return Ok(None),
        };
        let _guards = self
            .game_locks
            .acquire_pair(winner_game_id, loser_game_id)
            .await;

        let (mut winner, loser) = match (
            self.groups.find_by_id(winner_id).await,
            self.groups.find_by_id(loser_id).await,
        ) {
            (Some(w), Some(l)) => (w, l),
            _ => return Ok(None),
        };
        if !self.snapshot_compatible(&winner, &loser).await {
            return Ok(None);
        }
        let (mut winner_game, loser_game) = match (
            self.games.find_by_id(winner.game_id).await,
            self.games.find_by_id(loser.game_id).await,
        ) {
            (Some(wg), Some(lg)) => (wg, lg),
            _ => return Ok(None),
        };

        // Fold the absorbed side's owner and members into the winner,
        // keeping members unique and the owner out of the member set.
        if !winner.is_participant(loser.owner_id) {
            winner.members.push(GroupMember {
                user_id: loser.owner_id,
                user_name: loser.owner_name.clone(),
            });
        }
        for member in &loser.members {
            if !winner.is_participant(member.user_id) {
                winner.members.push(member.clone());
            }
        }

        // Mirror the union into the winning game: combined roster, combined
        // capacity, re-derived status.
        for player in &loser_game.accepted_players {
            if !winner_game.is_accepted(player.user_id) {
                winner_game.accepted_players.push(player.clone());
            }
        }
        winner_game.players_needed += loser_game.players_needed;
        winner_game.recompute_status();

        self.groups.update(winner.clone()).await?;
        self.games.update(winner_game).await?;
        self.groups.delete(loser.id).await;
        self.games.delete(loser.game_id).await;

        info!(
            "Merged group {} ({}) into {} ({})",
            loser.id, loser.name, winner.id, winner.name
        );

        let mut absorbed_users = vec![(loser.owner_id, loser.owner_name.clone())];
        absorbed_users.extend(
            loser
                .members
                .iter()
                .map(|m| (m.user_id, m.user_name.clone())),
        );
        for (user_id, _) in absorbed_users {
            self.notifier
                .notify(
                    user_id,
                    NotificationKind::GroupsMerged,
                    "Groups Merged",
                    format!("Your group {} was merged into {}", loser.name, winner.name),
                    json!({ "group_id": winner.id, "game_id": winner.game_id }),
                )
                .await;
        }

        Ok(Some(MergedPair {
            winner_group_id: winner.id,
            absorbed_group_id: loser.id,
        }))
    }
}

/// Same sport (case-insensitive) within merge range
fn games_compatible(a: &Game, b: &Game) -> bool {
    a.sport.eq_ignore_ascii_case(&b.sport)
        && geo::haversine_km(a.location.coordinates(), b.location.coordinates()) <= MERGE_RADIUS_KM
}
