//! Domain models for the Huddle backend.
//!
//! This module contains the core entities of the pickup-sports platform:
//! games (recruitment posts), the chat groups bound to them, and the
//! supporting user/turf/social records.

pub mod friend;
pub mod game;
pub mod group;
pub mod message;
pub mod notification;
pub mod rating;
pub mod turf;
pub mod user;

// Re-export all models for convenient access
pub use friend::{Friend, FriendRequest, FriendRequestStatus};
pub use game::{AcceptedPlayer, Game, GameStatus, JoinRequest, Location};
pub use group::{Booking, Group, GroupMember};
pub use message::Message;
pub use notification::{Notification, NotificationKind};
pub use rating::Rating;
pub use turf::Turf;
pub use user::{PlayerStats, User};
