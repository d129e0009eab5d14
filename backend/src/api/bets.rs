use crate::api::{extract::AuthUser, required};
use crate::error::AppResult;
use crate::services::PlacedBet;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct PlaceBetRequest {
    pub event: Option<Uuid>,
    pub score1: Option<i32>,
    pub score2: Option<i32>,
}

pub async fn place_bet(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    body: Result<Json<PlaceBetRequest>, JsonRejection>,
) -> AppResult<Json<PlacedBet>> {
    let Json(req) = body?;
    let event = required(req.event, "event")?;
    let placed = state
        .betting
        .place_bet(&user, event, req.score1, req.score2)
        .await?;
    Ok(Json(placed))
}
