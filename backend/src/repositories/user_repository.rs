use crate::error::{RepoResult, RepositoryError};
use crate::models::{User, UserProfile};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// Users, their profiles and auth token digests
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Store a new user together with its profile and first token digest
    async fn create(
        &self,
        user: &User,
        profile: &UserProfile,
        token_digest: &str,
    ) -> RepoResult<User>;

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<User>>;

    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>>;

    /// Resolve the owner of a token digest
    async fn find_by_token_digest(&self, digest: &str) -> RepoResult<Option<User>>;

    /// Revoke every token of the user and store `token_digest` as the only one
    async fn replace_token(&self, user_id: Uuid, token_digest: &str) -> RepoResult<()>;

    /// Users for the given ids; unknown ids are skipped
    async fn find_many(&self, ids: &[Uuid]) -> RepoResult<Vec<User>>;

    async fn find_profile(&self, user_id: Uuid) -> RepoResult<Option<UserProfile>>;

    /// Profiles for the given user ids; users without a profile are skipped
    async fn find_profiles(&self, user_ids: &[Uuid]) -> RepoResult<Vec<UserProfile>>;

    /// Overwrite image and bio of an existing profile
    async fn update_profile(&self, profile: &UserProfile) -> RepoResult<UserProfile>;
}

/// PostgreSQL user repository
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new PgUserRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(
        &self,
        user: &User,
        profile: &UserProfile,
        token_digest: &str,
    ) -> RepoResult<User> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, created_at)
            VALUES ($1, $2, $3)
            RETURNING id, username, created_at
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(user.created_at)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO user_profiles (user_id, image, is_premium, bio)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(created.id)
        .bind(&profile.image)
        .bind(profile.is_premium)
        .bind(&profile.bio)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO auth_tokens (token_digest, user_id)
            VALUES ($1, $2)
            "#,
        )
        .bind(token_digest)
        .bind(created.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_token_digest(&self, digest: &str) -> RepoResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.username, u.created_at
            FROM auth_tokens t
            JOIN users u ON u.id = t.user_id
            WHERE t.token_digest = $1
            "#,
        )
        .bind(digest)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn replace_token(&self, user_id: Uuid, token_digest: &str) -> RepoResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM auth_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO auth_tokens (token_digest, user_id)
            VALUES ($1, $2)
            "#,
        )
        .bind(token_digest)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn find_many(&self, ids: &[Uuid]) -> RepoResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, created_at
            FROM users
            WHERE id = ANY($1)
            ORDER BY username ASC
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn find_profile(&self, user_id: Uuid) -> RepoResult<Option<UserProfile>> {
        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT user_id, image, is_premium, bio
            FROM user_profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    async fn find_profiles(&self, user_ids: &[Uuid]) -> RepoResult<Vec<UserProfile>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        let profiles = sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT user_id, image, is_premium, bio
            FROM user_profiles
            WHERE user_id = ANY($1)
            "#,
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(profiles)
    }

    async fn update_profile(&self, profile: &UserProfile) -> RepoResult<UserProfile> {
        sqlx::query_as::<_, UserProfile>(
            r#"
            UPDATE user_profiles
            SET image = $2, bio = $3
            WHERE user_id = $1
            RETURNING user_id, image, is_premium, bio
            "#,
        )
        .bind(profile.user_id)
        .bind(&profile.image)
        .bind(&profile.bio)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound("Profile not found".to_string()))
    }
}
