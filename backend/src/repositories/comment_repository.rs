use crate::error::RepoResult;
use crate::models::Comment;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// Group comments
#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create(&self, comment: &Comment) -> RepoResult<Comment>;

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Comment>>;

    /// Comments of a group, newest first
    async fn find_by_group(&self, group_id: Uuid) -> RepoResult<Vec<Comment>>;

    async fn delete(&self, id: Uuid) -> RepoResult<bool>;
}

/// PostgreSQL comment repository
pub struct PgCommentRepository {
    pool: PgPool,
}

impl PgCommentRepository {
    /// Create a new PgCommentRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    async fn create(&self, comment: &Comment) -> RepoResult<Comment> {
        let created = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (id, group_id, user_id, description, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, group_id, user_id, description, created_at
            "#,
        )
        .bind(comment.id)
        .bind(comment.group_id)
        .bind(comment.user_id)
        .bind(&comment.description)
        .bind(comment.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, group_id, user_id, description, created_at
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(comment)
    }

    async fn find_by_group(&self, group_id: Uuid) -> RepoResult<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, group_id, user_id, description, created_at
            FROM comments
            WHERE group_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(comments)
    }

    async fn delete(&self, id: Uuid) -> RepoResult<bool> {
        let rows_affected = sqlx::query(
            r#"
            DELETE FROM comments
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
