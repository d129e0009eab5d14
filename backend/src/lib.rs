//! Tipster Backend Library
//!
//! Groups, fixtures and score predictions with points standings.
//! This module exposes the backend components for the binary and for tests.

pub mod api;
pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod presentation;
pub mod repositories;
pub mod scoring;
pub mod services;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AppError, AppResult};

use database::Database;
use repositories::Repositories;
use services::{BettingService, EventService, GroupService, KeyedLocks, UserService};
use std::sync::Arc;

/// Application state containing the repositories and services
pub struct AppState {
    /// `None` when running on the in-memory store
    pub database: Option<Database>,
    pub repos: Repositories,
    pub users: UserService,
    pub groups: GroupService,
    pub events: EventService,
    pub betting: BettingService,
}

impl AppState {
    /// Create a new AppState over the given repositories
    pub fn new(repos: Repositories, database: Option<Database>) -> Self {
        // Result submission and betting on the same event exclude each other
        let event_locks = Arc::new(KeyedLocks::new());

        Self {
            database,
            users: UserService::new(repos.clone()),
            groups: GroupService::new(repos.clone()),
            events: EventService::new(repos.clone(), event_locks.clone()),
            betting: BettingService::new(repos.clone(), event_locks),
            repos,
        }
    }

    /// State backed by PostgreSQL
    pub fn postgres(pool: sqlx::PgPool) -> Self {
        Self::new(Repositories::postgres(pool.clone()), Some(Database::new(pool)))
    }

    /// State backed by a fresh in-memory store
    pub fn in_memory() -> Self {
        Self::new(Repositories::in_memory(), None)
    }
}
