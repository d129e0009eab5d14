use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const NAME_MAX_LEN: usize = 32;
pub const LOCATION_MAX_LEN: usize = 32;
pub const DESCRIPTION_MAX_LEN: usize = 256;

/// A social circle of users tracking a shared set of events.
/// Unique on (name, location).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl Group {
    pub fn new(name: String, location: String, description: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            location,
            description,
            created_at: Utc::now(),
        }
    }

    /// Validate field lengths and presence
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name is required".to_string());
        }
        if self.location.trim().is_empty() {
            return Err("location is required".to_string());
        }
        if self.name.chars().count() > NAME_MAX_LEN {
            return Err(format!("name must be at most {} characters", NAME_MAX_LEN));
        }
        if self.location.chars().count() > LOCATION_MAX_LEN {
            return Err(format!("location must be at most {} characters", LOCATION_MAX_LEN));
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_validate() {
        let group = Group::new("Pub League".into(), "Dublin".into(), "".into());
        assert!(group.validate().is_ok());

        let group = Group::new(" ".into(), "Dublin".into(), "".into());
        assert!(group.validate().is_err());

        let group = Group::new("x".repeat(33), "Dublin".into(), "".into());
        assert!(group.validate().is_err());
    }
}
