use anyhow::Result;
use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::users::{NewUser, User, UserAccess, UserRepository};
use crate::infrastructure::db::DbPool;

const USER_COLUMNS: &str = "id, username, email, password_hash, employee_id, is_active, \
     is_void, refresh_token_hash, refresh_token_expires_at, created_at, updated_at";

pub struct PostgresUserRepository {
    pool: DbPool,
}

impl PostgresUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, new_user: NewUser) -> Result<User> {
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, email, password_hash, employee_id)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(new_user.employee_id)
        .fetch_one(&mut *tx)
        .await?;

        if !new_user.roles.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO user_roles (user_id, role_id)
                SELECT $1, id FROM roles WHERE name = ANY($2)
                "#,
            )
            .bind(user.id)
            .bind(&new_user.roles)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_employee_id(&self, employee_id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE employee_id = $1"
        ))
        .bind(employee_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn access(&self, user_id: Uuid) -> Result<UserAccess> {
        let roles: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT r.name
            FROM roles r
            JOIN user_roles ur ON ur.role_id = r.id
            WHERE ur.user_id = $1
            ORDER BY r.name
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let permissions: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT rp.permission
            FROM role_permissions rp
            JOIN user_roles ur ON ur.role_id = rp.role_id
            WHERE ur.user_id = $1
            ORDER BY rp.permission
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(UserAccess { roles, permissions })
    }

    async fn store_refresh_token(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: OffsetDateTime,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET refresh_token_hash = $2,
                refresh_token_expires_at = $3,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(token_hash)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn rotate_refresh_token(
        &self,
        old_hash: &str,
        new_hash: &str,
        expires_at: OffsetDateTime,
    ) -> Result<Option<User>> {
        // Single conditional UPDATE keyed on the stored hash: of two
        // concurrent rotations of the same token, only one can match.
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET refresh_token_hash = $2,
                refresh_token_expires_at = $3,
                updated_at = NOW()
            WHERE refresh_token_hash = $1
              AND refresh_token_expires_at > NOW()
              AND is_active
              AND NOT is_void
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(old_hash)
        .bind(new_hash)
        .bind(expires_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn clear_refresh_token(&self, user_id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET refresh_token_hash = NULL,
                refresh_token_expires_at = NULL,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
