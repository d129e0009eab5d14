//! Group handlers

use crate::api::{
    extract::{AuthUser, IdPath, MaybeUser},
    required,
};
use crate::error::AppResult;
use crate::models::Group;
use crate::presentation::GroupDetail;
use crate::services::GroupUpdate;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct GroupRequest {
    pub name: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
}

pub async fn list_groups(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<Group>>> {
    Ok(Json(state.groups.list_groups().await?))
}

pub async fn create_group(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    body: Result<Json<GroupRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Group>)> {
    let Json(req) = body?;
    let name = required(req.name, "name")?;
    let location = required(req.location, "location")?;
    let description = req.description.unwrap_or_default();

    let group = state
        .groups
        .create_group(&user, &name, &location, &description)
        .await?;
    Ok((StatusCode::CREATED, Json(group)))
}

pub async fn get_group(
    State(state): State<Arc<AppState>>,
    MaybeUser(viewer): MaybeUser,
    IdPath(id): IdPath,
) -> AppResult<Json<GroupDetail>> {
    let detail = state
        .groups
        .group_detail(id, viewer.map(|u| u.id))
        .await?;
    Ok(Json(detail))
}

pub async fn update_group(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    IdPath(id): IdPath,
    body: Result<Json<GroupRequest>, JsonRejection>,
) -> AppResult<Json<Group>> {
    let Json(req) = body?;
    let update = GroupUpdate {
        name: req.name,
        location: req.location,
        description: req.description,
    };
    Ok(Json(state.groups.update_group(&user, id, update).await?))
}

pub async fn delete_group(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    IdPath(id): IdPath,
) -> AppResult<StatusCode> {
    state.groups.delete_group(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
