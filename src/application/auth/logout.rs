use std::sync::Arc;
use uuid::Uuid;

use crate::domain::users::UserRepository;
use crate::shared::error::AppError;

/// Clear the caller's stored refresh token so the session cannot be
/// extended. Idempotent: logging out twice is a no-op.
pub struct LogoutUseCase {
    user_repo: Arc<dyn UserRepository>,
}

impl LogoutUseCase {
    pub fn new(user_repo: Arc<dyn UserRepository>) -> Self {
        Self { user_repo }
    }

    #[tracing::instrument(skip(self))]
    pub async fn execute(&self, user_id: Uuid) -> Result<(), AppError> {
        self.user_repo
            .clear_refresh_token(user_id)
            .await
            .map_err(AppError::Internal)
    }
}
