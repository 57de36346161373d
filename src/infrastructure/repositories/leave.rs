use anyhow::Result;
use async_trait::async_trait;
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::domain::leave::{
    LeaveApplication, LeaveApplicationHistory, LeaveFilter, LeaveRepository,
    NewLeaveApplication, StatusChange,
};
use crate::infrastructure::db::DbPool;

const APPLICATION_COLUMNS: &str = "id, employee_id, leave_type_id, start_date, end_date, \
     half_day, description, status, approver_id, created_at, updated_at";

/// Row image of `leave_applications`; the status column is TEXT and is
/// parsed into the domain enum on the way out.
#[derive(FromRow)]
struct LeaveApplicationRow {
    id: i64,
    employee_id: i64,
    leave_type_id: i64,
    start_date: Date,
    end_date: Date,
    half_day: bool,
    description: Option<String>,
    status: String,
    approver_id: Option<i64>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl TryFrom<LeaveApplicationRow> for LeaveApplication {
    type Error = anyhow::Error;

    fn try_from(row: LeaveApplicationRow) -> Result<Self> {
        Ok(LeaveApplication {
            id: row.id,
            employee_id: row.employee_id,
            leave_type_id: row.leave_type_id,
            start_date: row.start_date,
            end_date: row.end_date,
            half_day: row.half_day,
            description: row.description,
            status: row.status.parse()?,
            approver_id: row.approver_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct HistoryRow {
    id: i64,
    application_id: i64,
    status: String,
    actor_user_id: Uuid,
    remarks: Option<String>,
    created_at: OffsetDateTime,
}

impl TryFrom<HistoryRow> for LeaveApplicationHistory {
    type Error = anyhow::Error;

    fn try_from(row: HistoryRow) -> Result<Self> {
        Ok(LeaveApplicationHistory {
            id: row.id,
            application_id: row.application_id,
            status: row.status.parse()?,
            actor_user_id: row.actor_user_id,
            remarks: row.remarks,
            created_at: row.created_at,
        })
    }
}

pub struct PostgresLeaveRepository {
    pool: DbPool,
}

impl PostgresLeaveRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LeaveRepository for PostgresLeaveRepository {
    async fn create(&self, new: NewLeaveApplication) -> Result<LeaveApplication> {
        let row = sqlx::query_as::<_, LeaveApplicationRow>(&format!(
            r#"
            INSERT INTO leave_applications
                (employee_id, leave_type_id, start_date, end_date, half_day,
                 description, approver_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {APPLICATION_COLUMNS}
            "#
        ))
        .bind(new.employee_id)
        .bind(new.leave_type_id)
        .bind(new.start_date)
        .bind(new.end_date)
        .bind(new.half_day)
        .bind(&new.description)
        .bind(new.approver_id)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<LeaveApplication>> {
        let row = sqlx::query_as::<_, LeaveApplicationRow>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM leave_applications WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn find_all(
        &self,
        filter: LeaveFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<LeaveApplication>> {
        let rows = sqlx::query_as::<_, LeaveApplicationRow>(&format!(
            r#"
            SELECT {APPLICATION_COLUMNS}
            FROM leave_applications
            WHERE ($1::BIGINT IS NULL OR employee_id = $1)
              AND ($2::TEXT IS NULL OR status = $2)
            ORDER BY created_at DESC, id DESC
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(filter.employee_id)
        .bind(filter.status.map(|s| s.as_str()))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn count(&self, filter: LeaveFilter) -> Result<i64> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM leave_applications
            WHERE ($1::BIGINT IS NULL OR employee_id = $1)
              AND ($2::TEXT IS NULL OR status = $2)
            "#,
        )
        .bind(filter.employee_id)
        .bind(filter.status.map(|s| s.as_str()))
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    async fn history(&self, application_id: i64) -> Result<Vec<LeaveApplicationHistory>> {
        let rows = sqlx::query_as::<_, HistoryRow>(
            r#"
            SELECT id, application_id, status, actor_user_id, remarks, created_at
            FROM leave_application_history
            WHERE application_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(application_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn transition(&self, change: StatusChange) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        // Compare-and-swap on the observed status: a concurrent transition
        // that already moved the row makes this a no-op and the caller
        // reports the conflict.
        let updated = sqlx::query(
            r#"
            UPDATE leave_applications
            SET status = $1,
                approver_id = COALESCE($2, approver_id),
                updated_at = NOW()
            WHERE id = $3 AND status = $4
            "#,
        )
        .bind(change.to.as_str())
        .bind(change.set_approver)
        .bind(change.application_id)
        .bind(change.from.as_str())
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query(
            r#"
            INSERT INTO leave_application_history
                (application_id, status, actor_user_id, remarks)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(change.application_id)
        .bind(change.to.as_str())
        .bind(change.actor_user_id)
        .bind(&change.remarks)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }
}
