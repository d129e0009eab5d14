pub mod betting_service;
pub mod event_service;
pub mod group_service;
pub mod locks;
pub mod user_service;

pub use betting_service::{check_betting_window, BettingService, PlacedBet};
pub use event_service::{EventService, EventUpdate};
pub use group_service::{GroupService, GroupUpdate};
pub use locks::KeyedLocks;
pub use user_service::{ProfileUpdate, Registration, UserService};

use crate::error::{AppError, AppResult};
use crate::models::Member;
use crate::presentation::UserDirectory;
use crate::repositories::Repositories;
use uuid::Uuid;

/// Load the users (with profiles) referenced by one response
pub(crate) async fn load_directory(
    repos: &Repositories,
    mut user_ids: Vec<Uuid>,
) -> AppResult<UserDirectory> {
    user_ids.sort();
    user_ids.dedup();
    let users = repos.users.find_many(&user_ids).await?;
    let profiles = repos.users.find_profiles(&user_ids).await?;
    Ok(UserDirectory::new(users, profiles))
}

/// Membership of `user_id` in `group_id`, required to carry the admin flag
pub(crate) async fn require_admin(
    repos: &Repositories,
    group_id: Uuid,
    user_id: Uuid,
) -> AppResult<Member> {
    match repos.members.find(group_id, user_id).await? {
        Some(member) if member.admin => Ok(member),
        _ => Err(AppError::Forbidden(
            "Only group admins can perform this action".to_string(),
        )),
    }
}

/// Both scores of a submission, or a validation error naming the missing one
pub(crate) fn require_scores(
    score1: Option<i32>,
    score2: Option<i32>,
) -> AppResult<crate::scoring::Scoreline> {
    let score1 = score1.ok_or_else(|| AppError::Validation("score1 is required".to_string()))?;
    let score2 = score2.ok_or_else(|| AppError::Validation("score2 is required".to_string()))?;
    let scoreline = crate::scoring::Scoreline::new(score1, score2);
    scoreline.validate().map_err(AppError::Validation)?;
    Ok(scoreline)
}
