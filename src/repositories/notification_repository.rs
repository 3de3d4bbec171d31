use crate::error::StoreError;
use crate::models::Notification;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Repository for notification records
pub struct NotificationRepository {
    notifications: RwLock<HashMap<Uuid, Notification>>,
}

impl NotificationRepository {
    pub fn new() -> Self {
        Self {
            notifications: RwLock::new(HashMap::new()),
        }
    }

    pub async fn insert(&self, notification: Notification) -> Result<(), StoreError> {
        let mut notifications = self.notifications.write().await;
        if notifications.contains_key(&notification.id) {
            return Err(StoreError::Duplicate(format!(
                "notification {}",
                notification.id
            )));
        }
        notifications.insert(notification.id, notification);
        Ok(())
    }

    /// Notifications for a user, newest first
    pub async fn find_for_user(&self, user_id: Uuid, unread_only: bool) -> Vec<Notification> {
        let mut result: Vec<Notification> = self
            .notifications
            .read()
            .await
            .values()
            .filter(|n| n.user_id == user_id && (!unread_only || !n.read))
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        result
    }

    /// Mark one notification read; the recipient must match
    pub async fn mark_read(&self, id: Uuid, user_id: Uuid) -> Option<Notification> {
        let mut notifications = self.notifications.write().await;
        let notification = notifications.get_mut(&id).filter(|n| n.user_id == user_id)?;
        notification.read = true;
        Some(notification.clone())
    }

    /// Mark every notification for a user read, returning how many changed
    pub async fn mark_all_read(&self, user_id: Uuid) -> usize {
        let mut notifications = self.notifications.write().await;
        let mut changed = 0;
        for notification in notifications.values_mut() {
            if notification.user_id == user_id && !notification.read {
                notification.read = true;
                changed += 1;
            }
        }
        changed
    }
}

impl Default for NotificationRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NotificationKind;

    #[tokio::test]
    async fn test_unread_filter_and_mark_read() {
        let repo = NotificationRepository::new();
        let user = Uuid::new_v4();

        let n = Notification::new(
            user,
            NotificationKind::PlayerJoined,
            "New Player Joined!",
            "Ben joined your football game",
            serde_json::json!({}),
        );
        let id = n.id;
        repo.insert(n).await.unwrap();

        assert_eq!(repo.find_for_user(user, true).await.len(), 1);

        // wrong recipient cannot mark it read
        assert!(repo.mark_read(id, Uuid::new_v4()).await.is_none());

        assert!(repo.mark_read(id, user).await.unwrap().read);
        assert!(repo.find_for_user(user, true).await.is_empty());
        assert_eq!(repo.find_for_user(user, false).await.len(), 1);
    }
}
