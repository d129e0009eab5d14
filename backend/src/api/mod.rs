//! HTTP API handlers and router

pub mod bets;
pub mod comments;
pub mod events;
pub mod extract;
pub mod groups;
pub mod members;
pub mod users;

use crate::error::{AppError, AppResult};
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        // Users
        .route("/api/users", post(users::register))
        .route("/api/users/:id", get(users::get_user))
        .route("/api/token", post(users::rotate_token))
        .route(
            "/api/profile",
            get(users::get_profile).put(users::update_profile),
        )
        // Groups
        .route(
            "/api/groups",
            get(groups::list_groups).post(groups::create_group),
        )
        .route(
            "/api/groups/:id",
            get(groups::get_group)
                .put(groups::update_group)
                .delete(groups::delete_group),
        )
        // Events
        .route("/api/events", post(events::create_event))
        .route(
            "/api/events/:id",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        .route("/api/events/:id/result", put(events::set_result))
        // Membership
        .route("/api/members/join", post(members::join))
        .route("/api/members/leave", post(members::leave))
        // Bets
        .route("/api/bets/place", post(bets::place_bet))
        // Comments
        .route("/api/comments", post(comments::create_comment))
        .route("/api/comments/:id", delete(comments::delete_comment))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    match &state.database {
        Some(database) => match database.ping().await {
            Ok(()) => (
                StatusCode::OK,
                Json(json!({ "status": "ok", "store": "postgres" })),
            ),
            Err(e) => {
                warn!("Health check failed: {}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({ "status": "unavailable", "store": "postgres" })),
                )
            }
        },
        None => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "store": "memory" })),
        ),
    }
}

/// Unwrap a request field that must be present
pub(crate) fn required<T>(value: Option<T>, field: &str) -> AppResult<T> {
    value.ok_or_else(|| AppError::Validation(format!("{} is required", field)))
}
