use crate::error::StoreError;
use crate::models::Rating;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Repository for rating records
pub struct RatingRepository {
    ratings: RwLock<HashMap<Uuid, Rating>>,
}

impl RatingRepository {
    pub fn new() -> Self {
        Self {
            ratings: RwLock::new(HashMap::new()),
        }
    }

    pub async fn insert(&self, rating: Rating) -> Result<(), StoreError> {
        let mut ratings = self.ratings.write().await;
        if ratings.contains_key(&rating.id) {
            return Err(StoreError::Duplicate(format!("rating {}", rating.id)));
        }
        ratings.insert(rating.id, rating);
        Ok(())
    }

    /// Ratings received by a user, newest first
    pub async fn find_for_user(&self, rated_user_id: Uuid) -> Vec<Rating> {
        let mut result: Vec<Rating> = self
            .ratings
            .read()
            .await
            .values()
            .filter(|r| r.rated_user_id == rated_user_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        result
    }

    /// One rating per (game, rater, rated)
    pub async fn exists(&self, game_id: Uuid, rater_id: Uuid, rated_user_id: Uuid) -> bool {
        self.ratings.read().await.values().any(|r| {
            r.game_id == game_id && r.rater_id == rater_id && r.rated_user_id == rated_user_id
        })
    }
}

impl Default for RatingRepository {
    fn default() -> Self {
        Self::new()
    }
}
