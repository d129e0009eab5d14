use crate::error::{AppError, AppResult};
use crate::models::{Event, Member, User};
use crate::presentation::{self, BetView};
use crate::repositories::Repositories;
use crate::services::{load_directory, require_scores, KeyedLocks};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Outcome of a bet submission
#[derive(Debug, Clone, Serialize)]
pub struct PlacedBet {
    pub message: String,
    /// `true` when the bet was created, `false` when an existing bet was updated
    pub new: bool,
    pub result: BetView,
}

/// Decide whether a bet on `event` may be created or changed at `now`.
///
/// The event must not have started, and the bettor must be a member of its group.
/// Timing is checked first: a late bet is rejected whether or not the user is a member.
pub fn check_betting_window(
    event: &Event,
    membership: Option<&Member>,
    now: DateTime<Utc>,
) -> AppResult<()> {
    if event.has_started(now) {
        return Err(AppError::Timing("You can't place a bet. Too late!".to_string()));
    }
    match membership {
        Some(member) if member.group_id == event.group_id => Ok(()),
        _ => Err(AppError::Forbidden(
            "You can't place a bet. You are not a member of this group".to_string(),
        )),
    }
}

/// Service for placing score predictions
pub struct BettingService {
    repos: Repositories,
    event_locks: Arc<KeyedLocks<Uuid>>,
    bet_locks: KeyedLocks<(Uuid, Uuid)>,
}

impl BettingService {
    pub fn new(repos: Repositories, event_locks: Arc<KeyedLocks<Uuid>>) -> Self {
        Self {
            repos,
            event_locks,
            bet_locks: KeyedLocks::new(),
        }
    }

    /// Create or update `bettor`'s prediction for an event
    pub async fn place_bet(
        &self,
        bettor: &User,
        event_id: Uuid,
        score1: Option<i32>,
        score2: Option<i32>,
    ) -> AppResult<PlacedBet> {
        let prediction = require_scores(score1, score2)?;

        info!(
            "Placing bet: user={}, event={}, prediction={}-{}",
            bettor.id, event_id, prediction.score1, prediction.score2
        );

        // Results and fixture changes wait for in-flight bets, and vice versa
        let _event_guard = self.event_locks.read(event_id).await;
        let _bet_guard = self.bet_locks.write((bettor.id, event_id)).await;

        let event = self
            .repos
            .events
            .find_by_id(event_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Event {} not found", event_id)))?;
        let membership = self.repos.members.find(event.group_id, bettor.id).await?;

        if let Err(e) = check_betting_window(&event, membership.as_ref(), Utc::now()) {
            warn!("Bet rejected: user={}, event={}: {}", bettor.id, event_id, e);
            return Err(e);
        }

        let (bet, created) = self
            .repos
            .bets
            .upsert(bettor.id, event_id, prediction)
            .await?;

        info!(
            "Bet {}: id={}, user={}, event={}",
            if created { "created" } else { "updated" },
            bet.id,
            bettor.id,
            event_id
        );

        let directory = load_directory(&self.repos, vec![bettor.id]).await?;
        let result = presentation::bet_views(vec![bet], &directory)
            .pop()
            .ok_or_else(|| AppError::Message("bet was not stored".to_string()))?;

        Ok(PlacedBet {
            message: if created { "Bet Created" } else { "Bet Updated" }.to_string(),
            new: created,
            result,
        })
    }
}
