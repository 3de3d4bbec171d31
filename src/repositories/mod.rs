//! Store collaborators for the Huddle backend.
//!
//! The lifecycle core funnels every read-modify-write through these
//! repositories; nothing else holds record state. They are in-memory
//! (persistence technology is owned by the surrounding system), with the
//! interface shape of a CRUD store: find/insert/update/delete plus ordered
//! scans. Scans return records ordered by creation time so discovery
//! queries are deterministic.

pub mod friend_repository;
pub mod game_repository;
pub mod group_repository;
pub mod message_repository;
pub mod notification_repository;
pub mod rating_repository;
pub mod turf_repository;
pub mod user_repository;

pub use friend_repository::FriendRepository;
pub use game_repository::GameRepository;
pub use group_repository::GroupRepository;
pub use message_repository::MessageRepository;
pub use notification_repository::NotificationRepository;
pub use rating_repository::RatingRepository;
pub use turf_repository::TurfRepository;
pub use user_repository::UserRepository;
