//! Persistence port.
//!
//! Each entity has a repository trait with a PostgreSQL implementation next to it.
//! [`MemoryStore`] implements every trait in-process for development and tests.

pub mod bet_repository;
pub mod comment_repository;
pub mod event_repository;
pub mod group_repository;
pub mod member_repository;
pub mod memory;
pub mod user_repository;

// Re-export all repositories for convenient access
pub use bet_repository::{BetRepository, PgBetRepository};
pub use comment_repository::{CommentRepository, PgCommentRepository};
pub use event_repository::{EventRepository, PgEventRepository};
pub use group_repository::{GroupRepository, PgGroupRepository};
pub use member_repository::{MemberRepository, PgMemberRepository};
pub use memory::MemoryStore;
pub use user_repository::{PgUserRepository, UserRepository};

use sqlx::PgPool;
use std::sync::Arc;

/// One handle per repository, shared by all services
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub groups: Arc<dyn GroupRepository>,
    pub members: Arc<dyn MemberRepository>,
    pub events: Arc<dyn EventRepository>,
    pub bets: Arc<dyn BetRepository>,
    pub comments: Arc<dyn CommentRepository>,
}

impl Repositories {
    /// Repositories backed by PostgreSQL
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            groups: Arc::new(PgGroupRepository::new(pool.clone())),
            members: Arc::new(PgMemberRepository::new(pool.clone())),
            events: Arc::new(PgEventRepository::new(pool.clone())),
            bets: Arc::new(PgBetRepository::new(pool.clone())),
            comments: Arc::new(PgCommentRepository::new(pool)),
        }
    }

    /// Repositories backed by a fresh [`MemoryStore`]
    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            users: store.clone(),
            groups: store.clone(),
            members: store.clone(),
            events: store.clone(),
            bets: store.clone(),
            comments: store,
        }
    }
}
