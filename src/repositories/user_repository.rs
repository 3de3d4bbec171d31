use crate::error::StoreError;
use crate::models::User;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Repository for user records
pub struct UserRepository {
    users: RwLock<HashMap<Uuid, User>>,
}

impl UserRepository {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
        }
    }

    /// Insert a new user; emails are unique
    pub async fn insert(&self, user: User) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.id) {
            return Err(StoreError::Duplicate(format!("user {}", user.id)));
        }
        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate(format!("email {}", user.email)));
        }
        users.insert(user.id, user);
        Ok(())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Option<User> {
        self.users.read().await.get(&id).cloned()
    }

    pub async fn find_by_email(&self, email: &str) -> Option<User> {
        self.users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned()
    }

    pub async fn find_by_phone(&self, phone: &str) -> Option<User> {
        self.users
            .read()
            .await
            .values()
            .find(|u| u.phone == phone)
            .cloned()
    }

    /// Replace an existing user record
    pub async fn update(&self, user: User) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        if !users.contains_key(&user.id) {
            return Err(StoreError::Missing(format!("user {}", user.id)));
        }
        users.insert(user.id, user);
        Ok(())
    }
}

impl Default for UserRepository {
    fn default() -> Self {
        Self::new()
    }
}
