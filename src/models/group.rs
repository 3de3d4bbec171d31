use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A non-owner member of a group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupMember {
    pub user_id: Uuid,
    pub user_name: String,
}

/// Venue booking info; its presence arms the expiry timer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub turf_name: String,
    pub turf_address: String,
    pub booked_at: DateTime<Utc>,
}

/// Group model: the chat/coordination entity bound 1:1 to a Game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    /// The bound game
    pub game_id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    pub owner_name: String,
    /// Unique by user_id; never contains the owner. Kept in sync with the
    /// bound game's accepted_players minus the owner.
    pub members: Vec<GroupMember>,
    pub booking: Option<Booking>,
    /// Set to booked_at + TTL when a booking is made; absent otherwise
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Group {
    pub fn is_member(&self, user_id: Uuid) -> bool {
        self.members.iter().any(|m| m.user_id == user_id)
    }

    /// Owner or member
    pub fn is_participant(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id || self.is_member(user_id)
    }

    /// Member count including the owner
    pub fn participant_count(&self) -> usize {
        self.members.len() + 1
    }

    /// Remove a member by user id, returning the removed entry if present
    pub fn remove_member(&mut self, user_id: Uuid) -> Option<GroupMember> {
        let idx = self.members.iter().position(|m| m.user_id == user_id)?;
        Some(self.members.remove(idx))
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|at| at <= now).unwrap_or(false)
    }

    /// Display name of a participant, owner included
    pub fn participant_name(&self, user_id: Uuid) -> Option<&str> {
        if self.owner_id == user_id {
            return Some(&self.owner_name);
        }
        self.members
            .iter()
            .find(|m| m.user_id == user_id)
            .map(|m| m.user_name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_group() -> Group {
        Group {
            id: Uuid::new_v4(),
            game_id: Uuid::new_v4(),
            name: "football at the park".to_string(),
            owner_id: Uuid::new_v4(),
            owner_name: "Asha".to_string(),
            members: vec![GroupMember {
                user_id: Uuid::new_v4(),
                user_name: "Ben".to_string(),
            }],
            booking: None,
            expires_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_participant_checks() {
        let group = sample_group();
        assert!(group.is_participant(group.owner_id));
        assert!(group.is_participant(group.members[0].user_id));
        assert!(!group.is_member(group.owner_id));
        assert!(!group.is_participant(Uuid::new_v4()));
        assert_eq!(group.participant_count(), 2);
    }

    #[test]
    fn test_expiry_boundary() {
        let mut group = sample_group();
        let now = Utc::now();
        assert!(!group.is_expired(now));

        group.expires_at = Some(now);
        assert!(group.is_expired(now));
        assert!(!group.is_expired(now - Duration::seconds(1)));
        assert!(group.is_expired(now + Duration::seconds(1)));
    }
}
