use crate::auth;
use crate::error::{AppError, AppResult};
use crate::models::{user::BIO_MAX_LEN, User, UserProfile};
use crate::presentation::UserView;
use crate::repositories::Repositories;
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

/// A freshly issued token and its owner. Raw tokens are only ever returned in this shape.
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub token: String,
    pub user: UserView,
}

/// Profile fields to change. `None` leaves a field as is, an empty string clears it.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub image: Option<String>,
    pub bio: Option<String>,
}

/// Service for accounts, tokens and profiles
pub struct UserService {
    repos: Repositories,
}

impl UserService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Create a user with an empty profile and issue its API token
    pub async fn register(&self, username: &str) -> AppResult<Registration> {
        let username = username.trim();
        User::validate_username(username).map_err(AppError::Validation)?;

        if self.repos.users.find_by_username(username).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Username {} is already taken",
                username
            )));
        }

        let user = User::new(username.to_string());
        let profile = UserProfile::empty(user.id);
        let token = auth::generate_token();
        let user = self
            .repos
            .users
            .create(&user, &profile, &auth::token_digest(&token))
            .await?;

        info!("Registered user: id={}, username={}", user.id, user.username);

        Ok(Registration {
            token,
            user: UserView {
                id: user.id,
                username: user.username,
                profile: Some(profile),
            },
        })
    }

    /// Issue a new token for `user`; every previous token stops working
    pub async fn rotate_token(&self, user: &User) -> AppResult<Registration> {
        let token = auth::generate_token();
        self.repos
            .users
            .replace_token(user.id, &auth::token_digest(&token))
            .await?;

        info!("Rotated token for user {}", user.id);

        let profile = self.repos.users.find_profile(user.id).await?;
        Ok(Registration {
            token,
            user: UserView {
                id: user.id,
                username: user.username.clone(),
                profile,
            },
        })
    }

    /// Resolve a raw API token to its user
    pub async fn authenticate(&self, token: &str) -> AppResult<User> {
        let user = self
            .repos
            .users
            .find_by_token_digest(&auth::token_digest(token))
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid token".to_string()))?;

        debug!("Authenticated user {}", user.id);
        Ok(user)
    }

    pub async fn get_user(&self, user_id: Uuid) -> AppResult<UserView> {
        let user = self
            .repos
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;
        let profile = self.repos.users.find_profile(user_id).await?;

        Ok(UserView {
            id: user.id,
            username: user.username,
            profile,
        })
    }

    pub async fn get_profile(&self, user_id: Uuid) -> AppResult<UserProfile> {
        Ok(self
            .repos
            .users
            .find_profile(user_id)
            .await?
            .unwrap_or_else(|| UserProfile::empty(user_id)))
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        update: ProfileUpdate,
    ) -> AppResult<UserProfile> {
        let mut profile = self.get_profile(user_id).await?;

        if let Some(image) = update.image {
            let image = image.trim().to_string();
            profile.image = (!image.is_empty()).then_some(image);
        }
        if let Some(bio) = update.bio {
            if bio.chars().count() > BIO_MAX_LEN {
                return Err(AppError::Validation(format!(
                    "bio must be at most {} characters",
                    BIO_MAX_LEN
                )));
            }
            profile.bio = (!bio.is_empty()).then_some(bio);
        }

        let profile = self.repos.users.update_profile(&profile).await?;
        info!("Updated profile for user {}", user_id);
        Ok(profile)
    }
}
