use crate::error::StoreError;
use crate::models::{Friend, FriendRequest, FriendRequestStatus};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Repository for friend requests and the friend edges they become
pub struct FriendRepository {
    requests: RwLock<HashMap<Uuid, FriendRequest>>,
}

impl FriendRepository {
    pub fn new() -> Self {
        Self {
            requests: RwLock::new(HashMap::new()),
        }
    }

    pub async fn insert(&self, request: FriendRequest) -> Result<(), StoreError> {
        let mut requests = self.requests.write().await;
        if requests.contains_key(&request.id) {
            return Err(StoreError::Duplicate(format!("friend request {}", request.id)));
        }
        requests.insert(request.id, request);
        Ok(())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Option<FriendRequest> {
        self.requests.read().await.get(&id).cloned()
    }

    pub async fn update(&self, request: FriendRequest) -> Result<(), StoreError> {
        let mut requests = self.requests.write().await;
        if !requests.contains_key(&request.id) {
            return Err(StoreError::Missing(format!("friend request {}", request.id)));
        }
        requests.insert(request.id, request);
        Ok(())
    }

    /// Any request between two users, pending or accepted, either direction
    pub async fn find_between(&self, a: Uuid, b: Uuid) -> Option<FriendRequest> {
        self.requests
            .read()
            .await
            .values()
            .find(|r| r.connects(a, b))
            .cloned()
    }

    /// Requests awaiting this user's decision, oldest first
    pub async fn pending_for(&self, user_id: Uuid) -> Vec<FriendRequest> {
        let mut result: Vec<FriendRequest> = self
            .requests
            .read()
            .await
            .values()
            .filter(|r| r.to_user_id == user_id && r.status == FriendRequestStatus::Pending)
            .cloned()
            .collect();
        result.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        result
    }

    /// The user's friends, derived from accepted edges
    pub async fn friends_of(&self, user_id: Uuid) -> Vec<Friend> {
        let mut result: Vec<Friend> = self
            .requests
            .read()
            .await
            .values()
            .filter(|r| r.status == FriendRequestStatus::Accepted)
            .filter_map(|r| {
                if r.from_user_id == user_id {
                    Some(Friend {
                        user_id: r.to_user_id,
                        user_name: r.to_user_name.clone(),
                    })
                } else if r.to_user_id == user_id {
                    Some(Friend {
                        user_id: r.from_user_id,
                        user_name: r.from_user_name.clone(),
                    })
                } else {
                    None
                }
            })
            .collect();
        result.sort_by(|a, b| a.user_name.cmp(&b.user_name).then(a.user_id.cmp(&b.user_id)));
        result
    }

    /// Symmetric friendship check; gates direct messaging
    pub async fn are_friends(&self, a: Uuid, b: Uuid) -> bool {
        self.requests
            .read()
            .await
            .values()
            .any(|r| r.status == FriendRequestStatus::Accepted && r.connects(a, b))
    }
}

impl Default for FriendRepository {
    fn default() -> Self {
        Self::new()
    }
}
