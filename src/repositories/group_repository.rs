use crate::error::StoreError;
use crate::models::Group;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Repository for group records
pub struct GroupRepository {
    groups: RwLock<HashMap<Uuid, Group>>,
}

impl GroupRepository {
    pub fn new() -> Self {
        Self {
            groups: RwLock::new(HashMap::new()),
        }
    }

    /// Insert a new group
    pub async fn insert(&self, group: Group) -> Result<(), StoreError> {
        let mut groups = self.groups.write().await;
        if groups.contains_key(&group.id) {
            return Err(StoreError::Duplicate(format!("group {}", group.id)));
        }
        groups.insert(group.id, group);
        Ok(())
    }

    /// Find a group by id
    pub async fn find_by_id(&self, id: Uuid) -> Option<Group> {
        self.groups.read().await.get(&id).cloned()
    }

    /// Replace an existing group record
    pub async fn update(&self, group: Group) -> Result<(), StoreError> {
        let mut groups = self.groups.write().await;
        if !groups.contains_key(&group.id) {
            return Err(StoreError::Missing(format!("group {}", group.id)));
        }
        groups.insert(group.id, group);
        Ok(())
    }

    /// Delete a group, returning whether a record was removed
    pub async fn delete(&self, id: Uuid) -> bool {
        self.groups.write().await.remove(&id).is_some()
    }

    /// All groups, ordered by creation time (ties by id)
    pub async fn all(&self) -> Vec<Group> {
        let mut groups: Vec<Group> = self.groups.read().await.values().cloned().collect();
        groups.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        groups
    }

    /// Groups a user participates in (as owner or member), oldest first
    pub async fn find_for_user(&self, user_id: Uuid) -> Vec<Group> {
        let mut groups: Vec<Group> = self
            .groups
            .read()
            .await
            .values()
            .filter(|g| g.is_participant(user_id))
            .cloned()
            .collect();
        groups.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        groups
    }

    /// Number of groups a user participates in; the active-group cap is
    /// checked against this count
    pub async fn count_for_user(&self, user_id: Uuid) -> usize {
        self.groups
            .read()
            .await
            .values()
            .filter(|g| g.is_participant(user_id))
            .count()
    }
}

impl Default for GroupRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GroupMember;
    use chrono::Utc;

    fn group_owned_by(owner_id: Uuid) -> Group {
        Group {
            id: Uuid::new_v4(),
            game_id: Uuid::new_v4(),
            name: "cricket at the lot".to_string(),
            owner_id,
            owner_name: "Asha".to_string(),
            members: vec![],
            booking: None,
            expires_at: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_count_for_user_covers_owner_and_member() {
        let repo = GroupRepository::new();
        let user = Uuid::new_v4();

        // one owned group
        repo.insert(group_owned_by(user)).await.unwrap();

        // one group where the user is a plain member
        let mut joined = group_owned_by(Uuid::new_v4());
        joined.members.push(GroupMember {
            user_id: user,
            user_name: "Asha".to_string(),
        });
        repo.insert(joined).await.unwrap();

        // one unrelated group
        repo.insert(group_owned_by(Uuid::new_v4())).await.unwrap();

        assert_eq!(repo.count_for_user(user).await, 2);
        assert_eq!(repo.find_for_user(user).await.len(), 2);
    }
}
