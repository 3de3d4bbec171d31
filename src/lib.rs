//! Huddle Backend Library
//!
//! This module exposes the backend components for use by tests and other
//! consumers: the game/group lifecycle engine, the geospatial discovery
//! queries, and the social collaborators around them.

pub mod config;
pub mod error;
pub mod geo;
pub mod locks;
pub mod models;
pub mod repositories;
pub mod services;
pub mod websocket;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AppError, AppResult};

use locks::LockRegistry;
use repositories::*;
use std::sync::Arc;

/// Application state containing all repositories and the shared lock
/// registry the lifecycle services serialize on
pub struct AppState {
    pub game_repo: Arc<GameRepository>,
    pub group_repo: Arc<GroupRepository>,
    pub user_repo: Arc<UserRepository>,
    pub turf_repo: Arc<TurfRepository>,
    pub notification_repo: Arc<NotificationRepository>,
    pub friend_repo: Arc<FriendRepository>,
    pub message_repo: Arc<MessageRepository>,
    pub rating_repo: Arc<RatingRepository>,
    pub game_locks: Arc<LockRegistry>,
}

impl AppState {
    /// Create a new AppState with initialized repositories
    pub fn new() -> Self {
        Self {
            game_repo: Arc::new(GameRepository::new()),
            group_repo: Arc::new(GroupRepository::new()),
            user_repo: Arc::new(UserRepository::new()),
            turf_repo: Arc::new(TurfRepository::new()),
            notification_repo: Arc::new(NotificationRepository::new()),
            friend_repo: Arc::new(FriendRepository::new()),
            message_repo: Arc::new(MessageRepository::new()),
            rating_repo: Arc::new(RatingRepository::new()),
            game_locks: Arc::new(LockRegistry::new()),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
