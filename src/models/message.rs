use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Chat message model. Exactly one of `group_id` / `recipient_id` is set:
/// group messages carry the group, direct messages carry the recipient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub sender_name: String,
    pub body: String,
    pub group_id: Option<Uuid>,
    pub recipient_id: Option<Uuid>,
    pub sent_at: DateTime<Utc>,
}

impl Message {
    pub fn group(sender_id: Uuid, sender_name: impl Into<String>, group_id: Uuid, body: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender_id,
            sender_name: sender_name.into(),
            body: body.into(),
            group_id: Some(group_id),
            recipient_id: None,
            sent_at: Utc::now(),
        }
    }

    pub fn direct(sender_id: Uuid, sender_name: impl Into<String>, recipient_id: Uuid, body: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender_id,
            sender_name: sender_name.into(),
            body: body.into(),
            group_id: None,
            recipient_id: Some(recipient_id),
            sent_at: Utc::now(),
        }
    }
}
