use anyhow::Result;
use async_trait::async_trait;

use crate::domain::balance::LeaveBalanceLedger;
use crate::infrastructure::db::DbPool;

/// Ledger backed by the `leave_balances` table. The first adjustment for an
/// (employee, leave type) pair seeds the row from the leave type's annual
/// quota.
pub struct PostgresLeaveBalanceLedger {
    pool: DbPool,
}

impl PostgresLeaveBalanceLedger {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LeaveBalanceLedger for PostgresLeaveBalanceLedger {
    async fn adjust(
        &self,
        employee_id: i64,
        leave_type_id: i64,
        delta_used_days: f64,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO leave_balances (employee_id, leave_type_id, used_days, remaining_days)
            SELECT $1, $2, $3, lt.annual_quota_days - $3
            FROM leave_types lt
            WHERE lt.id = $2
            ON CONFLICT (employee_id, leave_type_id) DO UPDATE
            SET used_days = leave_balances.used_days + EXCLUDED.used_days,
                remaining_days = leave_balances.remaining_days - EXCLUDED.used_days
            "#,
        )
        .bind(employee_id)
        .bind(leave_type_id)
        .bind(delta_used_days)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
