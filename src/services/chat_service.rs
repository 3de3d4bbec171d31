use crate::error::{AppError, AppResult};
use crate::models::Message;
use crate::repositories::{FriendRepository, GroupRepository, MessageRepository, UserRepository};
use std::sync::Arc;
use uuid::Uuid;

/// Service for chat message history. Group traffic is restricted to current
/// group members (owner included); direct traffic is restricted to friends.
pub struct ChatService {
    messages: Arc<MessageRepository>,
    groups: Arc<GroupRepository>,
    friends: Arc<FriendRepository>,
    users: Arc<UserRepository>,
}

impl ChatService {
    pub fn new(
        messages: Arc<MessageRepository>,
        groups: Arc<GroupRepository>,
        friends: Arc<FriendRepository>,
        users: Arc<UserRepository>,
    ) -> Self {
        Self {
            messages,
            groups,
            friends,
            users,
        }
    }

    /// Send a message to a group; the sender must currently be a participant
    pub async fn send_group_message(
        &self,
        group_id: Uuid,
        sender_id: Uuid,
        body: String,
    ) -> AppResult<Message> {
        let group = self
            .groups
            .find_by_id(group_id)
            .await
            .ok_or_else(|| AppError::NotFound("Group not found".to_string()))?;
        let sender_name = group
            .participant_name(sender_id)
            .ok_or_else(|| {
                AppError::Forbidden("You are not a member of this group".to_string())
            })?
            .to_string();

        let message = Message::group(sender_id, sender_name, group_id, body);
        self.messages.insert(message.clone()).await?;
        Ok(message)
    }

    /// A group's message history; readable by current participants only
    pub async fn group_messages(&self, group_id: Uuid, user_id: Uuid) -> AppResult<Vec<Message>> {
        let group = self
            .groups
            .find_by_id(group_id)
            .await
            .ok_or_else(|| AppError::NotFound("Group not found".to_string()))?;
        if !group.is_participant(user_id) {
            return Err(AppError::Forbidden(
                "You are not a member of this group".to_string(),
            ));
        }
        Ok(self.messages.find_by_group(group_id).await)
    }

    /// Send a direct message; sender and recipient must be friends
    pub async fn send_direct_message(
        &self,
        from_user_id: Uuid,
        to_user_id: Uuid,
        body: String,
    ) -> AppResult<Message> {
        if !self.friends.are_friends(from_user_id, to_user_id).await {
            return Err(AppError::Forbidden(
                "You can only send direct messages to friends".to_string(),
            ));
        }
        let sender = self
            .users
            .find_by_id(from_user_id)
            .await
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let message = Message::direct(from_user_id, sender.name, to_user_id, body);
        self.messages.insert(message.clone()).await?;
        Ok(message)
    }

    /// Direct-message history between two users; friends only
    pub async fn direct_messages(&self, user_id: Uuid, friend_id: Uuid) -> AppResult<Vec<Message>> {
        if !self.friends.are_friends(user_id, friend_id).await {
            return Err(AppError::Forbidden(
                "You can only view messages with friends".to_string(),
            ));
        }
        Ok(self.messages.find_direct(user_id, friend_id).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FriendRequest, FriendRequestStatus, Group, GroupMember, User};
    use chrono::Utc;

    struct Fixture {
        service: ChatService,
        groups: Arc<GroupRepository>,
        friends: Arc<FriendRepository>,
        users: Arc<UserRepository>,
    }

    fn fixture() -> Fixture {
        let messages = Arc::new(MessageRepository::new());
        let groups = Arc::new(GroupRepository::new());
        let friends = Arc::new(FriendRepository::new());
        let users = Arc::new(UserRepository::new());
        Fixture {
            service: ChatService::new(messages, groups.clone(), friends.clone(), users.clone()),
            groups,
            friends,
            users,
        }
    }

    async fn seed_group(groups: &GroupRepository, owner_id: Uuid, member_id: Uuid) -> Uuid {
        let group = Group {
            id: Uuid::new_v4(),
            game_id: Uuid::new_v4(),
            name: "football at the park".to_string(),
            owner_id,
            owner_name: "Asha".to_string(),
            members: vec![GroupMember {
                user_id: member_id,
                user_name: "Ben".to_string(),
            }],
            booking: None,
            expires_at: None,
            created_at: Utc::now(),
        };
        let id = group.id;
        groups.insert(group).await.unwrap();
        id
    }

    #[tokio::test]
    async fn test_group_chat_gated_on_membership() {
        let fx = fixture();
        let (owner, member, outsider) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let group_id = seed_group(&fx.groups, owner, member).await;

        fx.service
            .send_group_message(group_id, owner, "kickoff at 6".to_string())
            .await
            .unwrap();
        fx.service
            .send_group_message(group_id, member, "on my way".to_string())
            .await
            .unwrap();

        let err = fx
            .service
            .send_group_message(group_id, outsider, "hi".to_string())
            .await
            .unwrap_err();
        assert!(err.is_forbidden());

        let history = fx.service.group_messages(group_id, member).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].sender_name, "Asha");

        assert!(fx
            .service
            .group_messages(group_id, outsider)
            .await
            .unwrap_err()
            .is_forbidden());
    }

    #[tokio::test]
    async fn test_direct_messages_require_friendship() {
        let fx = fixture();
        let asha = User::new("Asha", "asha@example.com", "1");
        let ben = User::new("Ben", "ben@example.com", "2");
        fx.users.insert(asha.clone()).await.unwrap();
        fx.users.insert(ben.clone()).await.unwrap();

        let err = fx
            .service
            .send_direct_message(asha.id, ben.id, "hey".to_string())
            .await
            .unwrap_err();
        assert!(err.is_forbidden());

        let mut edge = FriendRequest::new(asha.id, "Asha", ben.id, "Ben");
        edge.status = FriendRequestStatus::Accepted;
        fx.friends.insert(edge).await.unwrap();

        fx.service
            .send_direct_message(asha.id, ben.id, "hey".to_string())
            .await
            .unwrap();
        let history = fx.service.direct_messages(ben.id, asha.id).await.unwrap();
        assert_eq!(history.len(), 1);
    }
}
