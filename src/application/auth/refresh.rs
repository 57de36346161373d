use serde::Deserialize;
use std::sync::Arc;
use time::OffsetDateTime;
use validator::Validate;

use crate::application::auth::token_utils::{
    TokenResponse, generate_refresh_token, hash_token,
};
use crate::domain::auth::AuthService;
use crate::domain::users::UserRepository;
use crate::shared::error::AppError;

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

pub type RefreshTokenResponse = TokenResponse;

/// Exchange a refresh token for a new token pair.
///
/// Single-use-then-rotate: the stored hash is swapped for the new one in a
/// single conditional update, so the old token dies the moment the exchange
/// succeeds and a concurrent second exchange of the same token fails.
pub struct RefreshTokenUseCase {
    user_repo: Arc<dyn UserRepository>,
    auth_service: Arc<dyn AuthService>,
    access_token_ttl: i64,
    refresh_token_ttl: i64,
}

impl RefreshTokenUseCase {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        auth_service: Arc<dyn AuthService>,
        access_token_ttl: i64,
        refresh_token_ttl: i64,
    ) -> Self {
        Self {
            user_repo,
            auth_service,
            access_token_ttl,
            refresh_token_ttl,
        }
    }

    #[tracing::instrument(skip_all)]
    pub async fn execute(
        &self,
        req: RefreshTokenRequest,
    ) -> Result<RefreshTokenResponse, AppError> {
        let old_hash = hash_token(&req.refresh_token);

        let refresh_token = generate_refresh_token();
        let new_hash = hash_token(&refresh_token);
        let expires_at =
            OffsetDateTime::now_utc() + time::Duration::seconds(self.refresh_token_ttl);

        let user = self
            .user_repo
            .rotate_refresh_token(&old_hash, &new_hash, expires_at)
            .await
            .map_err(AppError::Internal)?
            .ok_or_else(|| {
                AppError::InvalidToken(
                    "refresh token is unknown, expired, or already used".to_string(),
                )
            })?;

        let access = self
            .user_repo
            .access(user.id)
            .await
            .map_err(AppError::Internal)?;

        let access_token = self
            .auth_service
            .generate_access_token(&user, &access)
            .map_err(AppError::Internal)?;

        Ok(TokenResponse {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_ttl,
        })
    }
}
