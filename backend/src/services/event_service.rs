use crate::error::{AppError, AppResult};
use crate::models::{Event, User};
use crate::presentation::{self, EventDetail};
use crate::repositories::Repositories;
use crate::services::{load_directory, require_admin, require_scores, KeyedLocks};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Fixture fields to change; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct EventUpdate {
    pub team1: Option<String>,
    pub team2: Option<String>,
    pub time: Option<DateTime<Utc>>,
}

/// Service for fixtures and their results
pub struct EventService {
    repos: Repositories,
    event_locks: Arc<KeyedLocks<Uuid>>,
}

impl EventService {
    pub fn new(repos: Repositories, event_locks: Arc<KeyedLocks<Uuid>>) -> Self {
        Self { repos, event_locks }
    }

    async fn get_event(&self, event_id: Uuid) -> AppResult<Event> {
        self.repos
            .events
            .find_by_id(event_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Event {} not found", event_id)))
    }

    pub async fn create_event(
        &self,
        requester: &User,
        group_id: Uuid,
        team1: &str,
        team2: &str,
        time: DateTime<Utc>,
    ) -> AppResult<Event> {
        info!(
            "Creating event: group={}, {} vs {} at {}",
            group_id, team1, team2, time
        );

        if self.repos.groups.find_by_id(group_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Group {} not found", group_id)));
        }
        require_admin(&self.repos, group_id, requester.id).await?;

        let event = Event::new(
            group_id,
            team1.trim().to_string(),
            team2.trim().to_string(),
            time,
        );
        event.validate().map_err(AppError::Validation)?;

        let event = self.repos.events.create(&event).await?;
        info!("Event created: id={}", event.id);
        Ok(event)
    }

    /// Event with the bets `requester` may see.
    /// Before kick-off that is only their own bet.
    pub async fn event_detail(&self, requester: &User, event_id: Uuid) -> AppResult<EventDetail> {
        let event = self.get_event(event_id).await?;
        self.build_detail(requester, event).await
    }

    async fn build_detail(&self, requester: &User, event: Event) -> AppResult<EventDetail> {
        let is_admin = self
            .repos
            .members
            .find(event.group_id, requester.id)
            .await?
            .map(|m| m.admin)
            .unwrap_or(false);
        let num_bets = self.repos.bets.count_by_event(event.id).await?;

        let bets = self.repos.bets.find_by_event(event.id).await?;
        let bets = presentation::visible_bets(&event, bets, requester.id, Utc::now());
        let directory = load_directory(&self.repos, bets.iter().map(|b| b.user_id).collect()).await?;

        Ok(EventDetail {
            bets: presentation::bet_views(bets, &directory),
            event,
            is_admin,
            num_bets,
        })
    }

    /// Change teams or kick-off. Not allowed once the event has a result.
    pub async fn update_event(
        &self,
        requester: &User,
        event_id: Uuid,
        update: EventUpdate,
    ) -> AppResult<Event> {
        let event = self.get_event(event_id).await?;
        require_admin(&self.repos, event.group_id, requester.id).await?;

        let _guard = self.event_locks.write(event_id).await;
        let mut event = self.get_event(event_id).await?;
        if event.is_scored() {
            return Err(AppError::Validation(
                "Event already has a result and can no longer be changed".to_string(),
            ));
        }

        if let Some(team1) = update.team1 {
            event.team1 = team1.trim().to_string();
        }
        if let Some(team2) = update.team2 {
            event.team2 = team2.trim().to_string();
        }
        if let Some(time) = update.time {
            event.time = time;
        }
        event.validate().map_err(AppError::Validation)?;

        let event = self.repos.events.update(&event).await?;
        info!("Event updated: id={}", event.id);
        Ok(event)
    }

    pub async fn delete_event(&self, requester: &User, event_id: Uuid) -> AppResult<()> {
        let event = self.get_event(event_id).await?;
        require_admin(&self.repos, event.group_id, requester.id).await?;

        let _guard = self.event_locks.write(event_id).await;
        if !self.repos.events.delete(event_id).await? {
            return Err(AppError::NotFound(format!("Event {} not found", event_id)));
        }
        info!("Event deleted: id={}", event_id);
        Ok(())
    }

    /// Record the final score and recompute the points of every bet on the event.
    ///
    /// Submitting again (the same or a corrected score) overwrites all points.
    /// Bets are excluded for the duration, so none is scored against a stale result.
    pub async fn set_result(
        &self,
        requester: &User,
        event_id: Uuid,
        score1: Option<i32>,
        score2: Option<i32>,
    ) -> AppResult<EventDetail> {
        let result = require_scores(score1, score2)?;

        let event = self.get_event(event_id).await?;
        require_admin(&self.repos, event.group_id, requester.id).await?;

        let _guard = self.event_locks.write(event_id).await;
        let event = self.get_event(event_id).await?;
        if !event.has_started(Utc::now()) {
            return Err(AppError::Timing(
                "You can't set the result before the event starts".to_string(),
            ));
        }

        let (event, scored) = self.repos.events.finalize(event_id, result).await?;
        info!(
            "Result set: event={}, score={}-{}, bets scored={}",
            event_id,
            result.score1,
            result.score2,
            scored.len()
        );

        self.build_detail(requester, event).await
    }
}
