use axum::{extract::FromRequestParts, http::request::Parts};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::auth::{Actor, AuthService, Claims};
use crate::domain::users::UserRepository;
use crate::infrastructure::state::AppState;
use crate::shared::error::AppError;

/// Authenticated caller, extracted from the `Authorization: Bearer` header
/// and verified against the configured signing key.
pub struct AuthUser {
    pub claims: Claims,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| {
                AppError::Authentication("Missing Authorization header".to_string())
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Authentication("Invalid Authorization header format".to_string())
        })?;

        let claims = state
            .auth_service
            .validate_token(token)
            .map_err(|_| AppError::InvalidToken("invalid or expired token".to_string()))?;

        Ok(AuthUser { claims })
    }
}

impl AuthUser {
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        self.claims
            .user_id()
            .map_err(|_| AppError::InvalidToken("malformed subject claim".to_string()))
    }

    /// Resolve the full actor: permissions come from the verified claims,
    /// the employee link from the user record (it is not a claim).
    pub async fn actor(&self, user_repo: &Arc<dyn UserRepository>) -> Result<Actor, AppError> {
        let user_id = self.user_id()?;

        let user = user_repo
            .find_by_id(user_id)
            .await
            .map_err(AppError::Internal)?
            .ok_or_else(|| AppError::Authentication("unknown user".to_string()))?;

        if !user.is_active || user.is_void {
            return Err(AppError::Authentication("account is disabled".to_string()));
        }

        Ok(Actor::new(
            user_id,
            user.employee_id,
            self.claims.permission.clone(),
        ))
    }
}
