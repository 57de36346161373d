use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use crate::application::auth::token_utils::{TokenResponse, issue_session};
use crate::domain::auth::AuthService;
use crate::domain::password::PasswordHashingService;
use crate::domain::users::UserRepository;
use crate::shared::error::AppError;

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    #[schema(example = "jdoe")]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

pub type LoginResponse = TokenResponse;

pub struct LoginUseCase {
    user_repo: Arc<dyn UserRepository>,
    auth_service: Arc<dyn AuthService>,
    password_service: Arc<dyn PasswordHashingService>,
    access_token_ttl: i64,
    refresh_token_ttl: i64,
}

impl LoginUseCase {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        auth_service: Arc<dyn AuthService>,
        password_service: Arc<dyn PasswordHashingService>,
        access_token_ttl: i64,
        refresh_token_ttl: i64,
    ) -> Self {
        Self {
            user_repo,
            auth_service,
            password_service,
            access_token_ttl,
            refresh_token_ttl,
        }
    }

    #[tracing::instrument(skip(self, req), fields(username = %req.username))]
    pub async fn execute(&self, req: LoginRequest) -> Result<LoginResponse, AppError> {
        let user = self
            .user_repo
            .find_by_username(&req.username)
            .await
            .map_err(AppError::Internal)?
            .ok_or_else(|| AppError::Authentication("invalid credentials".to_string()))?;

        if !user.is_active || user.is_void {
            return Err(AppError::Authentication("account is disabled".to_string()));
        }

        let valid = self
            .password_service
            .verify_password(&req.password, &user.password_hash)
            .map_err(AppError::Internal)?;

        if !valid {
            return Err(AppError::Authentication("invalid credentials".to_string()));
        }

        issue_session(
            &user,
            &self.user_repo,
            &self.auth_service,
            self.access_token_ttl,
            self.refresh_token_ttl,
        )
        .await
    }
}
