use anyhow::Result;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::users::{User, UserAccess};

/// Permission names flattened into access-token claims.
pub mod permissions {
    pub const LEAVE_APPLY: &str = "leave.apply";
    pub const LEAVE_APPROVE: &str = "leave.approve";
    pub const LEAVE_VOID: &str = "leave.void";
    pub const LEAVE_VIEW: &str = "leave.view";
    pub const USERS_MANAGE: &str = "users.manage";
}

/// JWT claims carried by every access token.
///
/// The claim set is part of the wire contract: `sub` and `UserId` both hold
/// the user id, `role` and `permission` are arrays with one entry per role
/// and per flattened permission name, `jti` is unique per token and `exp`
/// is `iat` plus the configured access-token lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(rename = "UserId")]
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub role: Vec<String>,
    pub permission: Vec<String>,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user: &User, access: &UserAccess, ttl_seconds: i64) -> Self {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        Self {
            sub: user.id.to_string(),
            user_id: user.id.to_string(),
            name: user.username.clone(),
            email: user.email.clone(),
            role: access.roles.clone(),
            permission: access.permissions.clone(),
            jti: Uuid::new_v4().to_string(),
            iat: now,
            exp: now + ttl_seconds,
        }
    }

    pub fn user_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub)
            .map_err(|e| anyhow::anyhow!("invalid user id in claims: {}", e))
    }
}

/// Service for signing and verifying access tokens.
///
/// Refresh tokens are opaque random values, not JWTs; they never pass
/// through this service.
pub trait AuthService: Send + Sync {
    fn generate_access_token(&self, user: &User, access: &UserAccess) -> Result<String>;

    /// Verify signature and expiry, returning the embedded claims.
    fn validate_token(&self, token: &str) -> Result<Claims>;
}

/// The authenticated caller of an operation, resolved from verified claims
/// plus the user record (the employee link is not a claim).
#[derive(Debug, Clone)]
pub struct Actor {
    pub user_id: Uuid,
    pub employee_id: Option<i64>,
    pub permissions: Vec<String>,
}

impl Actor {
    pub fn new(user_id: Uuid, employee_id: Option<i64>, permissions: Vec<String>) -> Self {
        Self {
            user_id,
            employee_id,
            permissions,
        }
    }

    pub fn can(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }
}
