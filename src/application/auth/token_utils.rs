use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use time::OffsetDateTime;

use crate::domain::auth::AuthService;
use crate::domain::users::{User, UserRepository};
use crate::shared::error::AppError;

/// Response shape shared by login and refresh.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Access-token lifetime in seconds.
    pub expires_in: i64,
}

/// Generate an opaque refresh token: 32 cryptographically random bytes,
/// base64url-encoded without padding.
pub fn generate_refresh_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// SHA-256 of a raw refresh token, hex-encoded. Only the hash is stored.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Issue a fresh access/refresh pair for `user` and persist the refresh
/// token hash on the user row, displacing any previous session.
pub async fn issue_session(
    user: &User,
    user_repo: &Arc<dyn UserRepository>,
    auth_service: &Arc<dyn AuthService>,
    access_token_ttl: i64,
    refresh_token_ttl: i64,
) -> Result<TokenResponse, AppError> {
    let access = user_repo
        .access(user.id)
        .await
        .map_err(AppError::Internal)?;

    let access_token = auth_service
        .generate_access_token(user, &access)
        .map_err(AppError::Internal)?;

    let refresh_token = generate_refresh_token();
    let expires_at = OffsetDateTime::now_utc() + time::Duration::seconds(refresh_token_ttl);

    user_repo
        .store_refresh_token(user.id, &hash_token(&refresh_token), expires_at)
        .await
        .map_err(AppError::Internal)?;

    Ok(TokenResponse {
        access_token,
        refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: access_token_ttl,
    })
}
