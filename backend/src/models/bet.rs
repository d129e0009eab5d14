use crate::scoring::Scoreline;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A user's score prediction for an event. At most one per (user, event).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Bet {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub score1: i32,
    pub score2: i32,
    /// `None` until the event has a result
    pub points: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Bet {
    /// Create a new, unscored Bet
    pub fn new(user_id: Uuid, event_id: Uuid, prediction: Scoreline) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            event_id,
            score1: prediction.score1,
            score2: prediction.score2,
            points: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn prediction(&self) -> Scoreline {
        Scoreline::new(self.score1, self.score2)
    }
}
