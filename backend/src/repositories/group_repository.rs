use crate::error::{RepoResult, RepositoryError};
use crate::models::{Group, Member};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// Groups. Deleting a group removes its members, events, bets and comments.
#[async_trait]
pub trait GroupRepository: Send + Sync {
    /// Insert a group and its founding member in one step
    async fn create(&self, group: &Group, founder: &Member) -> RepoResult<Group>;

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Group>>;

    /// All groups, by name then location
    async fn list(&self) -> RepoResult<Vec<Group>>;

    /// Overwrite name, location and description
    async fn update(&self, group: &Group) -> RepoResult<Group>;

    async fn delete(&self, id: Uuid) -> RepoResult<bool>;
}

/// PostgreSQL group repository
pub struct PgGroupRepository {
    pool: PgPool,
}

impl PgGroupRepository {
    /// Create a new PgGroupRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GroupRepository for PgGroupRepository {
    async fn create(&self, group: &Group, founder: &Member) -> RepoResult<Group> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, Group>(
            r#"
            INSERT INTO groups (id, name, location, description, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, location, description, created_at
            "#,
        )
        .bind(group.id)
        .bind(&group.name)
        .bind(&group.location)
        .bind(&group.description)
        .bind(group.created_at)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO members (group_id, user_id, admin, joined_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(created.id)
        .bind(founder.user_id)
        .bind(founder.admin)
        .bind(founder.joined_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Group>> {
        let group = sqlx::query_as::<_, Group>(
            r#"
            SELECT id, name, location, description, created_at
            FROM groups
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(group)
    }

    async fn list(&self) -> RepoResult<Vec<Group>> {
        let groups = sqlx::query_as::<_, Group>(
            r#"
            SELECT id, name, location, description, created_at
            FROM groups
            ORDER BY name ASC, location ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(groups)
    }

    async fn update(&self, group: &Group) -> RepoResult<Group> {
        sqlx::query_as::<_, Group>(
            r#"
            UPDATE groups
            SET name = $2, location = $3, description = $4
            WHERE id = $1
            RETURNING id, name, location, description, created_at
            "#,
        )
        .bind(group.id)
        .bind(&group.name)
        .bind(&group.location)
        .bind(&group.description)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound("Group not found".to_string()))
    }

    async fn delete(&self, id: Uuid) -> RepoResult<bool> {
        let rows_affected = sqlx::query(
            r#"
            DELETE FROM groups
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(rows_affected > 0)
    }
}
