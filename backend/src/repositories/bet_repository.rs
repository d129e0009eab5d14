use crate::error::RepoResult;
use crate::models::Bet;
use crate::scoring::Scoreline;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// Score predictions
#[async_trait]
pub trait BetRepository: Send + Sync {
    /// Create the (user, event) bet, or overwrite the prediction of the existing one.
    /// Returns the stored bet and `true` when it was newly created.
    async fn upsert(
        &self,
        user_id: Uuid,
        event_id: Uuid,
        prediction: Scoreline,
    ) -> RepoResult<(Bet, bool)>;

    /// Bets on an event, oldest first
    async fn find_by_event(&self, event_id: Uuid) -> RepoResult<Vec<Bet>>;

    /// Bets on any event of a group
    async fn find_by_group(&self, group_id: Uuid) -> RepoResult<Vec<Bet>>;

    async fn count_by_event(&self, event_id: Uuid) -> RepoResult<i64>;
}

/// PostgreSQL bet repository
pub struct PgBetRepository {
    pool: PgPool,
}

impl PgBetRepository {
    /// Create a new PgBetRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BetRepository for PgBetRepository {
    async fn upsert(
        &self,
        user_id: Uuid,
        event_id: Uuid,
        prediction: Scoreline,
    ) -> RepoResult<(Bet, bool)> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_as::<_, Bet>(
            r#"
            SELECT id, user_id, event_id, score1, score2, points, created_at, updated_at
            FROM bets
            WHERE user_id = $1 AND event_id = $2
            FOR UPDATE
            "#,
        )
        .bind(user_id)
        .bind(event_id)
        .fetch_optional(&mut *tx)
        .await?;

        let result = match existing {
            Some(bet) => {
                let updated = sqlx::query_as::<_, Bet>(
                    r#"
                    UPDATE bets
                    SET score1 = $2, score2 = $3, updated_at = NOW()
                    WHERE id = $1
                    RETURNING id, user_id, event_id, score1, score2, points, created_at, updated_at
                    "#,
                )
                .bind(bet.id)
                .bind(prediction.score1)
                .bind(prediction.score2)
                .fetch_one(&mut *tx)
                .await?;
                (updated, false)
            }
            None => {
                let bet = Bet::new(user_id, event_id, prediction);
                // A racing insert from another process turns into an update
                let created = sqlx::query_as::<_, Bet>(
                    r#"
                    INSERT INTO bets (id, user_id, event_id, score1, score2, points, created_at, updated_at)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                    ON CONFLICT (user_id, event_id) DO UPDATE
                    SET score1 = EXCLUDED.score1, score2 = EXCLUDED.score2, updated_at = NOW()
                    RETURNING id, user_id, event_id, score1, score2, points, created_at, updated_at
                    "#,
                )
                .bind(bet.id)
                .bind(bet.user_id)
                .bind(bet.event_id)
                .bind(bet.score1)
                .bind(bet.score2)
                .bind(bet.points)
                .bind(bet.created_at)
                .bind(bet.updated_at)
                .fetch_one(&mut *tx)
                .await?;
                let is_new = created.id == bet.id;
                (created, is_new)
            }
        };

        tx.commit().await?;
        Ok(result)
    }

    async fn find_by_event(&self, event_id: Uuid) -> RepoResult<Vec<Bet>> {
        let bets = sqlx::query_as::<_, Bet>(
            r#"
            SELECT id, user_id, event_id, score1, score2, points, created_at, updated_at
            FROM bets
            WHERE event_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(bets)
    }

    async fn find_by_group(&self, group_id: Uuid) -> RepoResult<Vec<Bet>> {
        let bets = sqlx::query_as::<_, Bet>(
            r#"
            SELECT b.id, b.user_id, b.event_id, b.score1, b.score2, b.points,
                   b.created_at, b.updated_at
            FROM bets b
            JOIN events e ON e.id = b.event_id
            WHERE e.group_id = $1
            ORDER BY b.created_at ASC
            "#,
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(bets)
    }

    async fn count_by_event(&self, event_id: Uuid) -> RepoResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM bets
            WHERE event_id = $1
            "#,
        )
        .bind(event_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
