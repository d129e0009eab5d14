use crate::api::{
    extract::{AuthUser, IdPath},
    required,
};
use crate::error::AppResult;
use crate::presentation::CommentView;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub group: Option<Uuid>,
    pub description: Option<String>,
}

pub async fn create_comment(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    body: Result<Json<CommentRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<CommentView>)> {
    let Json(req) = body?;
    let group = required(req.group, "group")?;
    let description = required(req.description, "description")?;

    let comment = state.groups.post_comment(&user, group, &description).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn delete_comment(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    IdPath(id): IdPath,
) -> AppResult<StatusCode> {
    state.groups.delete_comment(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
