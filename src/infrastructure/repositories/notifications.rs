use anyhow::Result;
use async_trait::async_trait;

use crate::domain::notifications::{NewNotification, Notifier};
use crate::infrastructure::db::DbPool;

/// Notifier writing in-app notifications to the `notifications` table.
pub struct PostgresNotifier {
    pool: DbPool,
}

impl PostgresNotifier {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Notifier for PostgresNotifier {
    async fn notify(&self, notification: NewNotification) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO notifications
                (recipient_user_id, transaction_type, transaction_id, message)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(notification.recipient_user_id)
        .bind(notification.transaction_type.as_str())
        .bind(notification.transaction_id)
        .bind(&notification.message)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
