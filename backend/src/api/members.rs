//! Join and leave. `user` defaults to the caller.

use crate::api::{extract::AuthUser, required};
use crate::error::AppResult;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct MembershipRequest {
    pub group: Option<Uuid>,
    pub user: Option<Uuid>,
}

pub async fn join(
    State(state): State<Arc<AppState>>,
    AuthUser(requester): AuthUser,
    body: Result<Json<MembershipRequest>, JsonRejection>,
) -> AppResult<Json<Value>> {
    let Json(req) = body?;
    let group = required(req.group, "group")?;
    let user = req.user.unwrap_or(requester.id);

    let member = state.groups.join(&requester, group, user).await?;
    Ok(Json(json!({
        "message": "Joined group",
        "result": member,
    })))
}

pub async fn leave(
    State(state): State<Arc<AppState>>,
    AuthUser(requester): AuthUser,
    body: Result<Json<MembershipRequest>, JsonRejection>,
) -> AppResult<Json<Value>> {
    let Json(req) = body?;
    let group = required(req.group, "group")?;
    let user = req.user.unwrap_or(requester.id);

    state.groups.leave(&requester, group, user).await?;
    Ok(Json(json!({ "message": "Left group" })))
}
