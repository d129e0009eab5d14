use crate::error::RepoResult;
use crate::models::Member;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// Group membership records
#[async_trait]
pub trait MemberRepository: Send + Sync {
    /// Add a member. A second row for the same (group, user) is a `Duplicate`.
    async fn add(&self, member: &Member) -> RepoResult<Member>;

    /// Remove a member; `false` if there was nothing to remove
    async fn remove(&self, group_id: Uuid, user_id: Uuid) -> RepoResult<bool>;

    async fn find(&self, group_id: Uuid, user_id: Uuid) -> RepoResult<Option<Member>>;

    /// Members of a group, oldest first
    async fn find_by_group(&self, group_id: Uuid) -> RepoResult<Vec<Member>>;
}

/// PostgreSQL member repository
pub struct PgMemberRepository {
    pool: PgPool,
}

impl PgMemberRepository {
    /// Create a new PgMemberRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemberRepository for PgMemberRepository {
    async fn add(&self, member: &Member) -> RepoResult<Member> {
        let created = sqlx::query_as::<_, Member>(
            r#"
            INSERT INTO members (group_id, user_id, admin, joined_at)
            VALUES ($1, $2, $3, $4)
            RETURNING group_id, user_id, admin, joined_at
            "#,
        )
        .bind(member.group_id)
        .bind(member.user_id)
        .bind(member.admin)
        .bind(member.joined_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn remove(&self, group_id: Uuid, user_id: Uuid) -> RepoResult<bool> {
        let rows_affected = sqlx::query(
            r#"
            DELETE FROM members
            WHERE group_id = $1 AND user_id = $2
            "#,
        )
        .bind(group_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(rows_affected > 0)
    }

    async fn find(&self, group_id: Uuid, user_id: Uuid) -> RepoResult<Option<Member>> {
        let member = sqlx::query_as::<_, Member>(
            r#"
            SELECT group_id, user_id, admin, joined_at
            FROM members
            WHERE group_id = $1 AND user_id = $2
            "#,
        )
        .bind(group_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(member)
    }

    async fn find_by_group(&self, group_id: Uuid) -> RepoResult<Vec<Member>> {
        let members = sqlx::query_as::<_, Member>(
            r#"
            SELECT group_id, user_id, admin, joined_at
            FROM members
            WHERE group_id = $1
            ORDER BY joined_at ASC
            "#,
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(members)
    }
}
