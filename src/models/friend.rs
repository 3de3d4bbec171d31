use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendRequestStatus {
    Pending,
    Accepted,
}

/// Friend request model. An accepted request is the (symmetric) friend edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendRequest {
    pub id: Uuid,
    pub from_user_id: Uuid,
    pub from_user_name: String,
    pub to_user_id: Uuid,
    pub to_user_name: String,
    pub status: FriendRequestStatus,
    pub created_at: DateTime<Utc>,
}

impl FriendRequest {
    pub fn new(
        from_user_id: Uuid,
        from_user_name: impl Into<String>,
        to_user_id: Uuid,
        to_user_name: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            from_user_id,
            from_user_name: from_user_name.into(),
            to_user_id,
            to_user_name: to_user_name.into(),
            status: FriendRequestStatus::Pending,
            created_at: Utc::now(),
        }
    }

    /// True if the edge connects `a` and `b` in either direction
    pub fn connects(&self, a: Uuid, b: Uuid) -> bool {
        (self.from_user_id == a && self.to_user_id == b)
            || (self.from_user_id == b && self.to_user_id == a)
    }
}

/// The other side of an accepted friend edge, as seen by one user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Friend {
    pub user_id: Uuid,
    pub user_name: String,
}
