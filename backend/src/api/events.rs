//! Event handlers, including result submission

use crate::api::{
    extract::{AuthUser, IdPath},
    required,
};
use crate::error::AppResult;
use crate::models::Event;
use crate::presentation::EventDetail;
use crate::services::EventUpdate;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

/// `time` must carry a UTC offset (RFC 3339)
#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub group: Option<Uuid>,
    pub team1: Option<String>,
    pub team2: Option<String>,
    pub time: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEventRequest {
    pub team1: Option<String>,
    pub team2: Option<String>,
    pub time: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct ResultRequest {
    pub score1: Option<i32>,
    pub score2: Option<i32>,
}

pub async fn create_event(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    body: Result<Json<CreateEventRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Event>)> {
    let Json(req) = body?;
    let group = required(req.group, "group")?;
    let team1 = required(req.team1, "team1")?;
    let team2 = required(req.team2, "team2")?;
    let time = required(req.time, "time")?;

    let event = state
        .events
        .create_event(&user, group, &team1, &team2, time)
        .await?;
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn get_event(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    IdPath(id): IdPath,
) -> AppResult<Json<EventDetail>> {
    Ok(Json(state.events.event_detail(&user, id).await?))
}

pub async fn update_event(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    IdPath(id): IdPath,
    body: Result<Json<UpdateEventRequest>, JsonRejection>,
) -> AppResult<Json<Event>> {
    let Json(req) = body?;
    let update = EventUpdate {
        team1: req.team1,
        team2: req.team2,
        time: req.time,
    };
    Ok(Json(state.events.update_event(&user, id, update).await?))
}

pub async fn delete_event(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    IdPath(id): IdPath,
) -> AppResult<StatusCode> {
    state.events.delete_event(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_result(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    IdPath(id): IdPath,
    body: Result<Json<ResultRequest>, JsonRejection>,
) -> AppResult<Json<EventDetail>> {
    let Json(req) = body?;
    let detail = state
        .events
        .set_result(&user, id, req.score1, req.score2)
        .await?;
    Ok(Json(detail))
}
