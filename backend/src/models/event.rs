use crate::scoring::Scoreline;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const TEAM_MAX_LEN: usize = 32;

/// A match between two teams belonging to one group.
///
/// `score1` and `score2` are both `None` until a result is recorded, then both set.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub group_id: Uuid,
    pub team1: String,
    pub team2: String,
    pub time: DateTime<Utc>,
    pub score1: Option<i32>,
    pub score2: Option<i32>,
}

impl Event {
    /// Create a new, unscored Event
    pub fn new(group_id: Uuid, team1: String, team2: String, time: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            group_id,
            team1,
            team2,
            time,
            score1: None,
            score2: None,
        }
    }

    /// Final result, if one has been recorded
    pub fn result(&self) -> Option<Scoreline> {
        match (self.score1, self.score2) {
            (Some(score1), Some(score2)) => Some(Scoreline::new(score1, score2)),
            _ => None,
        }
    }

    pub fn is_scored(&self) -> bool {
        self.result().is_some()
    }

    /// Kick-off is at or before `now`
    pub fn has_started(&self, now: DateTime<Utc>) -> bool {
        self.time <= now
    }

    pub fn set_result(&mut self, result: Scoreline) {
        self.score1 = Some(result.score1);
        self.score2 = Some(result.score2);
    }

    /// Validate team names
    pub fn validate(&self) -> Result<(), String> {
        for (field, team) in [("team1", &self.team1), ("team2", &self.team2)] {
            if team.trim().is_empty() {
                return Err(format!("{} is required", field));
            }
            if team.chars().count() > TEAM_MAX_LEN {
                return Err(format!("{} must be at most {} characters", field, TEAM_MAX_LEN));
            }
        }
        Ok(())
    }
}
