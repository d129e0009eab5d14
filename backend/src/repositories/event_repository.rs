use crate::error::{RepoResult, RepositoryError};
use crate::models::{Bet, Event};
use crate::scoring::{self, Scoreline};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// Events and result recording
#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn create(&self, event: &Event) -> RepoResult<Event>;

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Event>>;

    /// Events of a group by kick-off time
    async fn find_by_group(&self, group_id: Uuid) -> RepoResult<Vec<Event>>;

    /// Overwrite teams and time. Scores are left untouched.
    async fn update(&self, event: &Event) -> RepoResult<Event>;

    async fn delete(&self, id: Uuid) -> RepoResult<bool>;

    /// Record the final score and recompute the points of every bet on the event,
    /// atomically. Previous points are overwritten, never accumulated.
    async fn finalize(&self, id: Uuid, result: Scoreline) -> RepoResult<(Event, Vec<Bet>)>;
}

/// PostgreSQL event repository
pub struct PgEventRepository {
    pool: PgPool,
}

impl PgEventRepository {
    /// Create a new PgEventRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventRepository for PgEventRepository {
    async fn create(&self, event: &Event) -> RepoResult<Event> {
        let created = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (id, group_id, team1, team2, time, score1, score2)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, group_id, team1, team2, time, score1, score2
            "#,
        )
        .bind(event.id)
        .bind(event.group_id)
        .bind(&event.team1)
        .bind(&event.team2)
        .bind(event.time)
        .bind(event.score1)
        .bind(event.score2)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Event>> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            SELECT id, group_id, team1, team2, time, score1, score2
            FROM events
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(event)
    }

    async fn find_by_group(&self, group_id: Uuid) -> RepoResult<Vec<Event>> {
        let events = sqlx::query_as::<_, Event>(
            r#"
            SELECT id, group_id, team1, team2, time, score1, score2
            FROM events
            WHERE group_id = $1
            ORDER BY time ASC
            "#,
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(events)
    }

    async fn update(&self, event: &Event) -> RepoResult<Event> {
        sqlx::query_as::<_, Event>(
            r#"
            UPDATE events
            SET team1 = $2, team2 = $3, time = $4
            WHERE id = $1
            RETURNING id, group_id, team1, team2, time, score1, score2
            "#,
        )
        .bind(event.id)
        .bind(&event.team1)
        .bind(&event.team2)
        .bind(event.time)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound("Event not found".to_string()))
    }

    async fn delete(&self, id: Uuid) -> RepoResult<bool> {
        let rows_affected = sqlx::query(
            r#"
            DELETE FROM events
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(rows_affected > 0)
    }

    async fn finalize(&self, id: Uuid, result: Scoreline) -> RepoResult<(Event, Vec<Bet>)> {
        let mut tx = self.pool.begin().await?;

        // Lock the event row so concurrent results for the same event serialize
        sqlx::query("SELECT id FROM events WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| RepositoryError::NotFound("Event not found".to_string()))?;

        let event = sqlx::query_as::<_, Event>(
            r#"
            UPDATE events
            SET score1 = $2, score2 = $3
            WHERE id = $1
            RETURNING id, group_id, team1, team2, time, score1, score2
            "#,
        )
        .bind(id)
        .bind(result.score1)
        .bind(result.score2)
        .fetch_one(&mut *tx)
        .await?;

        let mut bets = sqlx::query_as::<_, Bet>(
            r#"
            SELECT id, user_id, event_id, score1, score2, points, created_at, updated_at
            FROM bets
            WHERE event_id = $1
            ORDER BY created_at ASC
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        let scored = scoring::score_predictions(result, bets.iter().map(|b| (b.id, b.prediction())));
        for (bet, (bet_id, points)) in bets.iter_mut().zip(scored) {
            sqlx::query("UPDATE bets SET points = $2 WHERE id = $1")
                .bind(bet_id)
                .bind(points)
                .execute(&mut *tx)
                .await?;
            bet.points = Some(points);
        }

        tx.commit().await?;
        Ok((event, bets))
    }
}
