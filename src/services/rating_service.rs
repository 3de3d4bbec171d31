use crate::error::{AppError, AppResult};
use crate::models::{NotificationKind, Rating};
use crate::repositories::{GameRepository, RatingRepository, UserRepository};
use crate::services::Notifier;
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

/// Facet scores accompanying a rating; unset facets default to the overall
/// score
#[derive(Debug, Clone, Default)]
pub struct RatingInput {
    pub overall: u8,
    pub punctuality: Option<u8>,
    pub skill: Option<u8>,
    pub teamwork: Option<u8>,
    pub sportsmanship: Option<u8>,
    pub review: String,
}

/// Aggregate view of a user's received ratings
#[derive(Debug, Clone, Copy)]
pub struct RatingSummary {
    pub average_rating: f64,
    pub total_ratings: u32,
}

/// Service for post-game player ratings
pub struct RatingService {
    ratings: Arc<RatingRepository>,
    users: Arc<UserRepository>,
    games: Arc<GameRepository>,
    notifier: Arc<Notifier>,
}

impl RatingService {
    pub fn new(
        ratings: Arc<RatingRepository>,
        users: Arc<UserRepository>,
        games: Arc<GameRepository>,
        notifier: Arc<Notifier>,
    ) -> Self {
        Self {
            ratings,
            users,
            games,
            notifier,
        }
    }

    /// Rate a player after a game. One rating per (game, rater, rated);
    /// all scores must lie in [1,5]; self-rating is rejected.
    pub async fn rate_player(
        &self,
        game_id: Uuid,
        rater_id: Uuid,
        rated_user_id: Uuid,
        input: RatingInput,
    ) -> AppResult<(Rating, RatingSummary)> {
        if rater_id == rated_user_id {
            return Err(AppError::Validation("Cannot rate yourself".to_string()));
        }

        let rater = self
            .users
            .find_by_id(rater_id)
            .await
            .ok_or_else(|| AppError::NotFound("Rater not found".to_string()))?;
        let mut rated = self
            .users
            .find_by_id(rated_user_id)
            .await
            .ok_or_else(|| AppError::NotFound("Rated user not found".to_string()))?;
        if self.games.find_by_id(game_id).await.is_none() {
            return Err(AppError::NotFound("Game not found".to_string()));
        }

        let overall = input.overall;
        for score in [
            overall,
            input.punctuality.unwrap_or(overall),
            input.skill.unwrap_or(overall),
            input.teamwork.unwrap_or(overall),
            input.sportsmanship.unwrap_or(overall),
        ] {
            if !(1..=5).contains(&score) {
                return Err(AppError::Validation(
                    "Rating must be between 1 and 5".to_string(),
                ));
            }
        }

        if self.ratings.exists(game_id, rater_id, rated_user_id).await {
            return Err(AppError::Conflict(
                "You have already rated this player for this game".to_string(),
            ));
        }

        let rating = Rating {
            id: Uuid::new_v4(),
            game_id,
            rater_id,
            rater_name: rater.name.clone(),
            rated_user_id,
            rated_user_name: rated.name.clone(),
            overall,
            punctuality: input.punctuality.unwrap_or(overall),
            skill: input.skill.unwrap_or(overall),
            teamwork: input.teamwork.unwrap_or(overall),
            sportsmanship: input.sportsmanship.unwrap_or(overall),
            review: input.review,
            created_at: Utc::now(),
        };
        self.ratings.insert(rating.clone()).await?;

        // keep the rated user's rolling stats current
        let summary = summarize(&self.ratings.find_for_user(rated_user_id).await);
        rated.stats.average_rating = summary.average_rating;
        rated.stats.total_ratings = summary.total_ratings;
        self.users.update(rated).await?;

        self.notifier
            .notify(
                rated_user_id,
                NotificationKind::NewRating,
                "New Rating Received",
                format!("{} rated you {} stars", rater.name, overall),
                json!({ "rating_id": rating.id, "game_id": game_id }),
            )
            .await;

        Ok((rating, summary))
    }

    /// All ratings received by a user plus their aggregate
    pub async fn ratings_for(&self, user_id: Uuid) -> (Vec<Rating>, RatingSummary) {
        let ratings = self.ratings.find_for_user(user_id).await;
        let summary = summarize(&ratings);
        (ratings, summary)
    }
}

fn summarize(ratings: &[Rating]) -> RatingSummary {
    if ratings.is_empty() {
        return RatingSummary {
            average_rating: 0.0,
            total_ratings: 0,
        };
    }
    let sum: u32 = ratings.iter().map(|r| r.overall as u32).sum();
    RatingSummary {
        average_rating: sum as f64 / ratings.len() as f64,
        total_ratings: ratings.len() as u32,
    }
}
