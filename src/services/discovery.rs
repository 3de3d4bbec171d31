use crate::geo::{self, Coordinates};
use crate::models::{Game, Turf};
use crate::repositories::{GameRepository, TurfRepository};
use std::sync::Arc;
use uuid::Uuid;

/// Venue search range around a game's own location in the annotated query
pub const TURF_SEARCH_RADIUS_KM: f64 = 5.0;

/// A discovery hit with its distance from the query origin, rounded for
/// API responses
#[derive(Debug, Clone)]
pub struct Nearby<T> {
    pub record: T,
    pub distance_km: f64,
}

/// A nearby game annotated with the turfs around the game itself
#[derive(Debug, Clone)]
pub struct GameWithTurfs {
    pub game: Game,
    pub distance_km: f64,
    pub nearby_turfs: Vec<Nearby<Turf>>,
}

/// Read-only proximity queries over games and turfs. Never mutates state;
/// results are ordered ascending by distance with ties in store order.
pub struct DiscoveryService {
    games: Arc<GameRepository>,
    turfs: Arc<TurfRepository>,
}

impl DiscoveryService {
    pub fn new(games: Arc<GameRepository>, turfs: Arc<TurfRepository>) -> Self {
        Self { games, turfs }
    }

    /// Games within `radius_km` of `origin`, optionally restricted to one
    /// sport
    pub async fn nearby_games(
        &self,
        origin: Coordinates,
        radius_km: f64,
        sport: Option<&str>,
    ) -> Vec<Nearby<Game>> {
        let candidates = self.games.all().await;
        geo::nearby(origin, candidates, radius_km, sport)
            .into_iter()
            .map(|(game, distance)| Nearby {
                record: game,
                distance_km: geo::round_km(distance),
            })
            .collect()
    }

    /// Turfs within `radius_km` of `origin`, optionally restricted to one
    /// sport
    pub async fn nearby_turfs(
        &self,
        origin: Coordinates,
        radius_km: f64,
        sport: Option<&str>,
    ) -> Vec<Nearby<Turf>> {
        let candidates = self.turfs.all().await;
        geo::nearby(origin, candidates, radius_km, sport)
            .into_iter()
            .map(|(turf, distance)| Nearby {
                record: turf,
                distance_km: geo::round_km(distance),
            })
            .collect()
    }

    /// Nearby games, each annotated with the turfs around the game's own
    /// location (not the query origin)
    pub async fn nearby_games_with_turfs(
        &self,
        origin: Coordinates,
        radius_km: f64,
        sport: Option<&str>,
    ) -> Vec<GameWithTurfs> {
        let turfs = self.turfs.all().await;
        let games = self.nearby_games(origin, radius_km, sport).await;

        games
            .into_iter()
            .map(|hit| {
                let around_game = geo::nearby(
                    hit.record.location.coordinates(),
                    turfs.clone(),
                    TURF_SEARCH_RADIUS_KM,
                    None,
                )
                .into_iter()
                .map(|(turf, distance)| Nearby {
                    record: turf,
                    distance_km: geo::round_km(distance),
                })
                .collect();
                GameWithTurfs {
                    game: hit.record,
                    distance_km: hit.distance_km,
                    nearby_turfs: around_game,
                }
            })
            .collect()
    }

    pub async fn turfs_for_owner(&self, owner_id: Uuid) -> Vec<Turf> {
        self.turfs.find_by_owner(owner_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GameStatus, Location};
    use chrono::Utc;

    fn game_at(sport: &str, lat: f64, lng: f64) -> Game {
        Game {
            id: Uuid::new_v4(),
            creator_id: Uuid::new_v4(),
            creator_name: "host".to_string(),
            sport: sport.to_string(),
            players_needed: 4,
            location: Location {
                lat,
                lng,
                address: String::new(),
            },
            description: String::new(),
            scheduled_at: None,
            accepted_players: vec![],
            pending_requests: vec![],
            status: GameStatus::Open,
            group_id: Uuid::new_v4(),
            created_at: Utc::now(),
        }
    }

    fn turf_at(name: &str, lat: f64, lng: f64) -> Turf {
        Turf {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            owner_name: "owner".to_string(),
            name: name.to_string(),
            location: Location {
                lat,
                lng,
                address: String::new(),
            },
            sports: vec!["football".to_string(), "cricket".to_string()],
            price_per_hour: 1200.0,
            created_at: Utc::now(),
        }
    }

    fn service() -> (DiscoveryService, Arc<GameRepository>, Arc<TurfRepository>) {
        let games = Arc::new(GameRepository::new());
        let turfs = Arc::new(TurfRepository::new());
        (DiscoveryService::new(games.clone(), turfs.clone()), games, turfs)
    }

    #[tokio::test]
    async fn test_nearby_games_filters_and_sorts() {
        let (svc, games, _) = service();
        games.insert(game_at("football", 0.0, 0.05)).await.unwrap();
        games.insert(game_at("football", 0.0, 0.01)).await.unwrap();
        games.insert(game_at("cricket", 0.0, 0.02)).await.unwrap();
        games.insert(game_at("football", 0.0, 2.0)).await.unwrap();

        let origin = Coordinates::new(0.0, 0.0);
        let hits = svc.nearby_games(origin, 10.0, Some("football")).await;

        assert_eq!(hits.len(), 2);
        assert!(hits[0].distance_km <= hits[1].distance_km);
        assert_eq!(hits[0].record.location.lng, 0.01);
    }

    #[tokio::test]
    async fn test_annotated_query_measures_turfs_from_the_game() {
        let (svc, games, turfs) = service();
        // game ~11 km east of the origin
        games.insert(game_at("football", 0.0, 0.1)).await.unwrap();
        // turf next to the game but ~12 km from the origin
        turfs.insert(turf_at("near-game", 0.0, 0.11)).await.unwrap();
        // turf next to the origin but ~11 km from the game
        turfs.insert(turf_at("near-origin", 0.0, 0.0)).await.unwrap();

        let origin = Coordinates::new(0.0, 0.0);
        let hits = svc.nearby_games_with_turfs(origin, 20.0, None).await;

        assert_eq!(hits.len(), 1);
        let names: Vec<&str> = hits[0]
            .nearby_turfs
            .iter()
            .map(|t| t.record.name.as_str())
            .collect();
        assert_eq!(names, vec!["near-game"]);
    }
}
