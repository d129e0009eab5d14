use crate::error::{AppError, AppResult};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Generate a new opaque API token (64 hex characters)
pub fn generate_token() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

/// Digest under which a token is stored. Raw tokens are never persisted.
pub fn token_digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Extract the token from an `Authorization` header value.
///
/// Accepts `Token <key>` and `Bearer <key>`.
pub fn parse_authorization(header: &str) -> AppResult<&str> {
    let token = header
        .strip_prefix("Token ")
        .or_else(|| header.strip_prefix("Bearer "))
        .map(str::trim)
        .ok_or_else(|| AppError::Unauthorized("Invalid Authorization header".to_string()))?;

    if token.is_empty() {
        return Err(AppError::Unauthorized("Missing token".to_string()));
    }

    Ok(token)
}
