pub mod chat_service;
pub mod discovery;
pub mod friend_service;
pub mod game_service;
pub mod group_service;
pub mod membership;
pub mod notifier;
pub mod rating_service;
pub mod reaper;

pub use chat_service::ChatService;
pub use discovery::{DiscoveryService, GameWithTurfs, Nearby};
pub use friend_service::FriendService;
pub use game_service::{GameService, NewGame};
pub use group_service::{GroupService, MergedPair};
pub use notifier::Notifier;
pub use rating_service::{RatingInput, RatingService, RatingSummary};
pub use reaper::{Reaper, ReaperReport};
