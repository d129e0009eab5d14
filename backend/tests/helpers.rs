#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use serde_json::Value;
use sqlx::PgPool;
use std::sync::Arc;
use tipster_backend::api;
use tipster_backend::models::*;
use tipster_backend::repositories::Repositories;
use tipster_backend::services::EventUpdate;
use tipster_backend::AppState;
use tower::ServiceExt;
use uuid::Uuid;

/// Application wired to a fresh in-memory store
pub struct TestApp {
    pub state: Arc<AppState>,
}

impl TestApp {
    pub fn new() -> Self {
        Self {
            state: Arc::new(AppState::in_memory()),
        }
    }

    pub fn router(&self) -> Router {
        api::router(self.state.clone())
    }

    /// Register a user, returning it with its API token
    pub async fn register(&self, username: &str) -> (User, String) {
        let registration = self
            .state
            .users
            .register(username)
            .await
            .expect("Failed to register user");
        let user = self
            .state
            .users
            .authenticate(&registration.token)
            .await
            .expect("Fresh token should authenticate");
        (user, registration.token)
    }

    pub async fn user(&self, username: &str) -> User {
        self.register(username).await.0
    }

    /// Create a group administered by `admin` with `members` joined
    pub async fn group_with_members(&self, admin: &User, members: &[&User]) -> Group {
        let group = self
            .state
            .groups
            .create_group(admin, &unique_name("Group"), "Dublin", "")
            .await
            .expect("Failed to create group");
        for member in members {
            self.state
                .groups
                .join(member, group.id, member.id)
                .await
                .expect("Failed to join group");
        }
        group
    }

    /// Create an event kicking off `offset` from now (negative for the past)
    pub async fn event_at(&self, admin: &User, group_id: Uuid, offset: Duration) -> Event {
        self.state
            .events
            .create_event(admin, group_id, "Rovers", "United", Utc::now() + offset)
            .await
            .expect("Failed to create event")
    }

    /// Move an unscored event's kick-off into the past
    pub async fn kick_off(&self, admin: &User, event_id: Uuid) -> Event {
        let update = EventUpdate {
            time: Some(Utc::now() - Duration::minutes(1)),
            ..EventUpdate::default()
        };
        self.state
            .events
            .update_event(admin, event_id, update)
            .await
            .expect("Failed to move kick-off")
    }

    pub async fn bet(&self, user: &User, event_id: Uuid, score1: i32, score2: i32) -> bool {
        self.state
            .betting
            .place_bet(user, event_id, Some(score1), Some(score2))
            .await
            .expect("Failed to place bet")
            .new
    }

    /// Points total of `user_id` as shown in the group detail
    pub async fn points_of(&self, group_id: Uuid, user_id: Uuid) -> i64 {
        self.state
            .groups
            .group_detail(group_id, None)
            .await
            .expect("Failed to load group")
            .members
            .into_iter()
            .find(|m| m.user.id == user_id)
            .map(|m| m.points)
            .expect("User is not a member")
    }
}

/// Short name that stays unique across a test run
pub fn unique_name(prefix: &str) -> String {
    format!("{} {}", prefix, &Uuid::new_v4().simple().to_string()[..8])
}

/// Send one request through the router and decode the JSON reply.
/// Empty bodies decode to `Value::Null`.
pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Token {}", token));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .expect("Failed to build request");

    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("Router failed");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Response is not JSON")
    };
    (status, json)
}

/// PostgreSQL-backed repositories for `#[sqlx::test]`
pub struct TestDatabase {
    pub pool: PgPool,
    pub repos: Repositories,
}

impl TestDatabase {
    pub fn from_pool(pool: PgPool) -> Self {
        Self {
            repos: Repositories::postgres(pool.clone()),
            pool,
        }
    }

    pub async fn create_user(&self, username: &str) -> User {
        let user = User::new(username.to_string());
        self.repos
            .users
            .create(&user, &UserProfile::empty(user.id), &tipster_backend::auth::token_digest(username))
            .await
            .expect("Failed to create test user")
    }

    pub async fn create_group(&self, admin: &User, name: &str) -> Group {
        let group = Group::new(name.to_string(), "Dublin".to_string(), String::new());
        self.repos
            .groups
            .create(&group, &Member::new(group.id, admin.id, true))
            .await
            .expect("Failed to create test group")
    }

    pub async fn create_event(&self, group_id: Uuid, offset: Duration) -> Event {
        let event = Event::new(
            group_id,
            "Rovers".to_string(),
            "United".to_string(),
            Utc::now() + offset,
        );
        self.repos
            .events
            .create(&event)
            .await
            .expect("Failed to create test event")
    }
}
