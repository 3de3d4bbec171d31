use crate::error::{AppError, AppResult};
use crate::models::{Friend, FriendRequest, FriendRequestStatus, NotificationKind};
use crate::repositories::{FriendRepository, UserRepository};
use crate::services::Notifier;
use serde_json::json;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Service for the friend system: requests, acceptance, and the symmetric
/// friendship relation that gates direct messaging
pub struct FriendService {
    friends: Arc<FriendRepository>,
    users: Arc<UserRepository>,
    notifier: Arc<Notifier>,
}

impl FriendService {
    pub fn new(
        friends: Arc<FriendRepository>,
        users: Arc<UserRepository>,
        notifier: Arc<Notifier>,
    ) -> Self {
        Self {
            friends,
            users,
            notifier,
        }
    }

    /// Send a friend request
    pub async fn send_request(&self, from_user_id: Uuid, to_user_id: Uuid) -> AppResult<FriendRequest> {
        if from_user_id == to_user_id {
            return Err(AppError::Validation(
                "Cannot send a friend request to yourself".to_string(),
            ));
        }
        let from = self
            .users
            .find_by_id(from_user_id)
            .await
            .ok_or_else(|| AppError::NotFound("Sender user not found".to_string()))?;
        let to = self
            .users
            .find_by_id(to_user_id)
            .await
            .ok_or_else(|| AppError::NotFound("Recipient user not found".to_string()))?;

        if self.friends.find_between(from_user_id, to_user_id).await.is_some() {
            return Err(AppError::Conflict(
                "Friend request already exists or you are already friends".to_string(),
            ));
        }

        let request = FriendRequest::new(from.id, from.name.clone(), to.id, to.name);
        self.friends.insert(request.clone()).await?;

        self.notifier
            .notify(
                to_user_id,
                NotificationKind::FriendRequest,
                "New Friend Request",
                format!("{} sent you a friend request", from.name),
                json!({ "from_user_id": from_user_id, "request_id": request.id }),
            )
            .await;

        Ok(request)
    }

    /// Accept a friend request; only the recipient may accept
    pub async fn accept_request(&self, request_id: Uuid, user_id: Uuid) -> AppResult<FriendRequest> {
        let mut request = self
            .friends
            .find_by_id(request_id)
            .await
            .ok_or_else(|| AppError::NotFound("Friend request not found".to_string()))?;

        if request.to_user_id != user_id {
            return Err(AppError::Forbidden(
                "Only the recipient can accept a friend request".to_string(),
            ));
        }
        if request.status != FriendRequestStatus::Pending {
            return Err(AppError::Conflict(
                "Friend request already accepted".to_string(),
            ));
        }

        request.status = FriendRequestStatus::Accepted;
        self.friends.update(request.clone()).await?;
        info!("Users {} and {} are now friends", request.from_user_id, user_id);

        self.notifier
            .notify(
                request.from_user_id,
                NotificationKind::FriendAccepted,
                "Friend Request Accepted!",
                format!("{} accepted your friend request", request.to_user_name),
                json!({ "friend_id": user_id }),
            )
            .await;

        Ok(request)
    }

    pub async fn pending_requests(&self, user_id: Uuid) -> Vec<FriendRequest> {
        self.friends.pending_for(user_id).await
    }

    pub async fn friends_of(&self, user_id: Uuid) -> Vec<Friend> {
        self.friends.friends_of(user_id).await
    }

    pub async fn are_friends(&self, a: Uuid, b: Uuid) -> bool {
        self.friends.are_friends(a, b).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;
    use crate::repositories::NotificationRepository;

    fn service() -> (FriendService, Arc<UserRepository>) {
        let friends = Arc::new(FriendRepository::new());
        let users = Arc::new(UserRepository::new());
        let notifier = Arc::new(Notifier::new(Arc::new(NotificationRepository::new())));
        (FriendService::new(friends, users.clone(), notifier), users)
    }

    async fn seed_user(users: &UserRepository, name: &str) -> User {
        let user = User::new(name, format!("{}@example.com", name), format!("+91-{}", name));
        users.insert(user.clone()).await.unwrap();
        user
    }

    #[tokio::test]
    async fn test_request_accept_makes_friends() {
        let (svc, users) = service();
        let asha = seed_user(&users, "asha").await;
        let ben = seed_user(&users, "ben").await;

        let request = svc.send_request(asha.id, ben.id).await.unwrap();
        assert!(!svc.are_friends(asha.id, ben.id).await);

        // only the recipient can accept
        let err = svc.accept_request(request.id, asha.id).await.unwrap_err();
        assert!(err.is_forbidden());

        svc.accept_request(request.id, ben.id).await.unwrap();
        assert!(svc.are_friends(asha.id, ben.id).await);
        assert!(svc.are_friends(ben.id, asha.id).await);
    }

    #[tokio::test]
    async fn test_duplicate_request_conflicts_either_direction() {
        let (svc, users) = service();
        let asha = seed_user(&users, "asha").await;
        let ben = seed_user(&users, "ben").await;

        svc.send_request(asha.id, ben.id).await.unwrap();
        assert!(svc.send_request(asha.id, ben.id).await.unwrap_err().is_conflict());
        assert!(svc.send_request(ben.id, asha.id).await.unwrap_err().is_conflict());
    }

    #[tokio::test]
    async fn test_self_request_rejected() {
        let (svc, users) = service();
        let asha = seed_user(&users, "asha").await;

        let err = svc.send_request(asha.id, asha.id).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
