use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A user's membership in a group. At most one per (group, user).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Member {
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub admin: bool,
    pub joined_at: DateTime<Utc>,
}

impl Member {
    pub fn new(group_id: Uuid, user_id: Uuid, admin: bool) -> Self {
        Self {
            group_id,
            user_id,
            admin,
            joined_at: Utc::now(),
        }
    }
}
