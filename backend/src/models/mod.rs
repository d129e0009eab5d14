//! Domain models for the Tipster backend.
//!
//! This module contains all database-backed models representing
//! the core entities of the prediction platform.

pub mod bet;
pub mod comment;
pub mod event;
pub mod group;
pub mod member;
pub mod user;

// Re-export all models for convenient access
pub use bet::Bet;
pub use comment::Comment;
pub use event::Event;
pub use group::Group;
pub use member::Member;
pub use user::{User, UserProfile};
