use crate::error::StoreError;
use crate::models::Message;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Repository for chat message records
pub struct MessageRepository {
    messages: RwLock<HashMap<Uuid, Message>>,
}

impl MessageRepository {
    pub fn new() -> Self {
        Self {
            messages: RwLock::new(HashMap::new()),
        }
    }

    pub async fn insert(&self, message: Message) -> Result<(), StoreError> {
        let mut messages = self.messages.write().await;
        if messages.contains_key(&message.id) {
            return Err(StoreError::Duplicate(format!("message {}", message.id)));
        }
        messages.insert(message.id, message);
        Ok(())
    }

    /// A group's message history, oldest first
    pub async fn find_by_group(&self, group_id: Uuid) -> Vec<Message> {
        let mut result: Vec<Message> = self
            .messages
            .read()
            .await
            .values()
            .filter(|m| m.group_id == Some(group_id))
            .cloned()
            .collect();
        result.sort_by(|a, b| a.sent_at.cmp(&b.sent_at).then(a.id.cmp(&b.id)));
        result
    }

    /// Direct-message history between two users, oldest first
    pub async fn find_direct(&self, a: Uuid, b: Uuid) -> Vec<Message> {
        let mut result: Vec<Message> = self
            .messages
            .read()
            .await
            .values()
            .filter(|m| {
                (m.sender_id == a && m.recipient_id == Some(b))
                    || (m.sender_id == b && m.recipient_id == Some(a))
            })
            .cloned()
            .collect();
        result.sort_by(|a, b| a.sent_at.cmp(&b.sent_at).then(a.id.cmp(&b.id)));
        result
    }
}

impl Default for MessageRepository {
    fn default() -> Self {
        Self::new()
    }
}
