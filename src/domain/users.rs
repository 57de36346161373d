use async_trait::async_trait;
use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow, utoipa::ToSchema)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String,
    /// Plain foreign-key identifier; employee data is looked up on demand,
    /// never embedded.
    pub employee_id: Option<i64>,
    pub is_active: bool,
    pub is_void: bool,
    #[serde(skip)]
    pub refresh_token_hash: Option<String>,
    #[serde(skip)]
    pub refresh_token_expires_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::iso8601")]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::iso8601")]
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub employee_id: Option<i64>,
    /// Role names to attach; unknown names are ignored by the repository.
    pub roles: Vec<String>,
}

/// Roles and flattened permission names for one user.
#[derive(Debug, Clone, Default)]
pub struct UserAccess {
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, new_user: NewUser) -> Result<User, anyhow::Error>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, anyhow::Error>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, anyhow::Error>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, anyhow::Error>;
    async fn find_by_employee_id(&self, employee_id: i64)
    -> Result<Option<User>, anyhow::Error>;
    async fn access(&self, user_id: Uuid) -> Result<UserAccess, anyhow::Error>;

    /// Store a refresh-token hash and expiry on the user row, overwriting
    /// whatever was there. A user holds at most one live refresh token.
    async fn store_refresh_token(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: OffsetDateTime,
    ) -> Result<(), anyhow::Error>;

    /// Atomically swap `old_hash` for `new_hash` on whichever active user
    /// row holds it, provided the stored expiry has not passed.
    ///
    /// Returns `None` when no row qualifies — the token is unknown,
    /// expired, or was already rotated by a concurrent refresh. Exactly one
    /// of two concurrent calls with the same `old_hash` can succeed.
    async fn rotate_refresh_token(
        &self,
        old_hash: &str,
        new_hash: &str,
        expires_at: OffsetDateTime,
    ) -> Result<Option<User>, anyhow::Error>;

    async fn clear_refresh_token(&self, user_id: Uuid) -> Result<(), anyhow::Error>;
}
