use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What happened, from the recipient's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    PlayerJoined,
    JoinedGame,
    JoinRequested,
    RequestAccepted,
    RequestDenied,
    PlayerLeft,
    KickedFromGame,
    RemovedFromGame,
    GameCancelled,
    GroupsMerged,
    FriendRequest,
    FriendAccepted,
    NewRating,
}

/// Notification model, written by the fire-and-forget notify collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    /// Free-form context, e.g. {"game_id": ..., "group_id": ...}
    pub context: serde_json::Value,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        user_id: Uuid,
        kind: NotificationKind,
        title: impl Into<String>,
        body: impl Into<String>,
        context: serde_json::Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            kind,
            title: title.into(),
            body: body.into(),
            context,
            read: false,
            created_at: Utc::now(),
        }
    }
}
