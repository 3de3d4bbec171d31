use crate::models::{Notification, NotificationKind};
use crate::repositories::NotificationRepository;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

/// Fire-and-forget notification sink. Delivery failures are logged and never
/// surface into lifecycle operations.
pub struct Notifier {
    notifications: Arc<NotificationRepository>,
}

impl Notifier {
    pub fn new(notifications: Arc<NotificationRepository>) -> Self {
        Self { notifications }
    }

    pub async fn notify(
        &self,
        user_id: Uuid,
        kind: NotificationKind,
        title: &str,
        body: String,
        context: serde_json::Value,
    ) {
        let notification = Notification::new(user_id, kind, title, body, context);
        if let Err(e) = self.notifications.insert(notification).await {
            warn!("Failed to record notification for {}: {}", user_id, e);
        }
    }
}
