use crate::error::StoreError;
use crate::models::Turf;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Repository for turf (venue) records
pub struct TurfRepository {
    turfs: RwLock<HashMap<Uuid, Turf>>,
}

impl TurfRepository {
    pub fn new() -> Self {
        Self {
            turfs: RwLock::new(HashMap::new()),
        }
    }

    pub async fn insert(&self, turf: Turf) -> Result<(), StoreError> {
        let mut turfs = self.turfs.write().await;
        if turfs.contains_key(&turf.id) {
            return Err(StoreError::Duplicate(format!("turf {}", turf.id)));
        }
        turfs.insert(turf.id, turf);
        Ok(())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Option<Turf> {
        self.turfs.read().await.get(&id).cloned()
    }

    pub async fn delete(&self, id: Uuid) -> bool {
        self.turfs.write().await.remove(&id).is_some()
    }

    /// All turfs, ordered by creation time (ties by id)
    pub async fn all(&self) -> Vec<Turf> {
        let mut turfs: Vec<Turf> = self.turfs.read().await.values().cloned().collect();
        turfs.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        turfs
    }

    pub async fn find_by_owner(&self, owner_id: Uuid) -> Vec<Turf> {
        let mut turfs: Vec<Turf> = self
            .turfs
            .read()
            .await
            .values()
            .filter(|t| t.owner_id == owner_id)
            .cloned()
            .collect();
        turfs.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        turfs
    }
}

impl Default for TurfRepository {
    fn default() -> Self {
        Self::new()
    }
}
