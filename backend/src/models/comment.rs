use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const DESCRIPTION_MAX_LEN: usize = 256;

/// Free-text message posted to a group
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(group_id: Uuid, user_id: Uuid, description: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            group_id,
            user_id,
            description,
            created_at: Utc::now(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.description.trim().is_empty() {
            return Err("description is required".to_string());
        }
        if self.description.chars().count() > DESCRIPTION_MAX_LEN {
            return Err(format!(
                "description must be at most {} characters",
                DESCRIPTION_MAX_LEN
            ));
        }
        Ok(())
    }
}
