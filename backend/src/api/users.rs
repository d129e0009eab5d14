//! Registration, token rotation, user lookup and own profile

use crate::api::{
    extract::{AuthUser, IdPath},
    required,
};
use crate::error::AppResult;
use crate::models::UserProfile;
use crate::presentation::UserView;
use crate::services::{ProfileUpdate, Registration};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub image: Option<String>,
    pub bio: Option<String>,
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Registration>)> {
    let Json(req) = body?;
    let username = required(req.username, "username")?;
    let registration = state.users.register(&username).await?;
    Ok((StatusCode::CREATED, Json(registration)))
}

/// Replaces the caller's token; the one used for this request is revoked.
pub async fn rotate_token(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> AppResult<Json<Registration>> {
    Ok(Json(state.users.rotate_token(&user).await?))
}

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    IdPath(id): IdPath,
) -> AppResult<Json<UserView>> {
    Ok(Json(state.users.get_user(id).await?))
}

pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> AppResult<Json<UserProfile>> {
    Ok(Json(state.users.get_profile(user.id).await?))
}

pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    body: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> AppResult<Json<UserProfile>> {
    let Json(req) = body?;
    let update = ProfileUpdate {
        image: req.image,
        bio: req.bio,
    };
    Ok(Json(state.users.update_profile(user.id, update).await?))
}
