use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use crate::domain::auth::{Actor, permissions};
use crate::domain::password::PasswordHashingService;
use crate::domain::users::{NewUser, User, UserRepository};
use crate::shared::error::AppError;

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreateUserRequest {
    #[validate(length(min = 3, message = "Username must be at least 3 characters"))]
    #[schema(example = "jdoe", min_length = 3)]
    pub username: String,
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "jdoe@example.com")]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[schema(min_length = 8)]
    pub password: String,
    /// Employee record this login belongs to, if any.
    pub employee_id: Option<i64>,
    /// Role names; defaults to Employee when empty.
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Provision a login. Requires the `users.manage` permission.
pub struct CreateUserUseCase {
    user_repo: Arc<dyn UserRepository>,
    password_service: Arc<dyn PasswordHashingService>,
}

impl CreateUserUseCase {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        password_service: Arc<dyn PasswordHashingService>,
    ) -> Self {
        Self {
            user_repo,
            password_service,
        }
    }

    #[tracing::instrument(skip(self, actor, req), fields(actor = %actor.user_id, username = %req.username))]
    pub async fn execute(&self, actor: &Actor, req: CreateUserRequest) -> Result<User, AppError> {
        if !actor.can(permissions::USERS_MANAGE) {
            return Err(AppError::Forbidden(
                "user management permission required".to_string(),
            ));
        }

        if self
            .user_repo
            .find_by_username(&req.username)
            .await
            .map_err(AppError::Internal)?
            .is_some()
        {
            return Err(AppError::Validation("Username already exists".to_string()));
        }
        if self
            .user_repo
            .find_by_email(&req.email)
            .await
            .map_err(AppError::Internal)?
            .is_some()
        {
            return Err(AppError::Validation("Email already exists".to_string()));
        }

        let password_hash = self
            .password_service
            .hash_password(&req.password)
            .map_err(AppError::Internal)?;

        let roles = if req.roles.is_empty() {
            vec!["Employee".to_string()]
        } else {
            req.roles
        };

        self.user_repo
            .create(NewUser {
                username: req.username,
                email: req.email,
                password_hash,
                employee_id: req.employee_id,
                roles,
            })
            .await
            .map_err(AppError::Internal)
    }
}
