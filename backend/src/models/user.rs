use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const USERNAME_MAX_LEN: usize = 150;
pub const BIO_MAX_LEN: usize = 256;

/// User account. Credentials live outside this service; only the identity is kept.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            username,
            created_at: Utc::now(),
        }
    }

    /// Letters, digits and `@.+-_`, 1 to 150 characters
    pub fn validate_username(username: &str) -> Result<(), String> {
        if username.is_empty() {
            return Err("username is required".to_string());
        }
        if username.chars().count() > USERNAME_MAX_LEN {
            return Err(format!("username must be at most {} characters", USERNAME_MAX_LEN));
        }
        if !username
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
        {
            return Err("username may only contain letters, digits and @/./+/-/_".to_string());
        }
        Ok(())
    }
}

/// Profile data attached to a user
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserProfile {
    pub user_id: Uuid,
    /// Avatar URL
    pub image: Option<String>,
    pub is_premium: bool,
    pub bio: Option<String>,
}

impl UserProfile {
    pub fn empty(user_id: Uuid) -> Self {
        Self {
            user_id,
            image: None,
            is_premium: false,
            bio: None,
        }
    }
}
