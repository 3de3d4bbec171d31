use crate::error::StoreError;
use crate::models::Game;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Repository for game records
pub struct GameRepository {
    games: RwLock<HashMap<Uuid, Game>>,
}

impl GameRepository {
    pub fn new() -> Self {
        Self {
            games: RwLock::new(HashMap::new()),
        }
    }

    /// Insert a new game
    pub async fn insert(&self, game: Game) -> Result<(), StoreError> {
        let mut games = self.games.write().await;
        if games.contains_key(&game.id) {
            return Err(StoreError::Duplicate(format!("game {}", game.id)));
        }
        games.insert(game.id, game);
        Ok(())
    }

    /// Find a game by id
    pub async fn find_by_id(&self, id: Uuid) -> Option<Game> {
        self.games.read().await.get(&id).cloned()
    }

    /// Replace an existing game record
    pub async fn update(&self, game: Game) -> Result<(), StoreError> {
        let mut games = self.games.write().await;
        if !games.contains_key(&game.id) {
            return Err(StoreError::Missing(format!("game {}", game.id)));
        }
        games.insert(game.id, game);
        Ok(())
    }

    /// Delete a game, returning whether a record was removed
    pub async fn delete(&self, id: Uuid) -> bool {
        self.games.write().await.remove(&id).is_some()
    }

    /// All games, ordered by creation time (ties by id)
    pub async fn all(&self) -> Vec<Game> {
        let mut games: Vec<Game> = self.games.read().await.values().cloned().collect();
        games.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        games
    }

    /// Games created by a user, newest first
    pub async fn find_by_creator(&self, user_id: Uuid) -> Vec<Game> {
        let mut games: Vec<Game> = self
            .games
            .read()
            .await
            .values()
            .filter(|g| g.creator_id == user_id)
            .cloned()
            .collect();
        games.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        games
    }
}

impl Default for GameRepository {
    fn default() -> Self {
        Self::new()
    }
}
