use serde::Deserialize;
use std::sync::Arc;
use time::Date;
use validator::Validate;

use crate::domain::auth::Actor;
use crate::domain::leave::{LeaveApplication, LeaveRepository, NewLeaveApplication};
use crate::shared::error::AppError;

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct ApplyLeaveRequest {
    #[schema(example = 1)]
    pub leave_type_id: i64,
    #[schema(value_type = String, format = Date, example = "2026-08-10")]
    pub start_date: Date,
    #[schema(value_type = String, format = Date, example = "2026-08-12")]
    pub end_date: Date,
    #[serde(default)]
    pub half_day: bool,
    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,
    /// Employee id of the approver to assign, if known at submission time.
    pub approver_id: Option<i64>,
}

/// Submit a leave application. It starts in UnderApproval; no history row
/// is written until the first transition.
pub struct ApplyLeaveUseCase {
    leave_repo: Arc<dyn LeaveRepository>,
}

impl ApplyLeaveUseCase {
    pub fn new(leave_repo: Arc<dyn LeaveRepository>) -> Self {
        Self { leave_repo }
    }

    #[tracing::instrument(skip(self, actor, req), fields(actor = %actor.user_id))]
    pub async fn execute(
        &self,
        actor: &Actor,
        req: ApplyLeaveRequest,
    ) -> Result<LeaveApplication, AppError> {
        let employee_id = actor
            .employee_id
            .ok_or_else(|| AppError::Forbidden("no employee profile".to_string()))?;

        if req.start_date > req.end_date {
            return Err(AppError::Validation(
                "start_date cannot be after end_date".to_string(),
            ));
        }
        if req.half_day && req.start_date != req.end_date {
            return Err(AppError::Validation(
                "half-day leave must cover a single day".to_string(),
            ));
        }

        self.leave_repo
            .create(NewLeaveApplication {
                employee_id,
                leave_type_id: req.leave_type_id,
                start_date: req.start_date,
                end_date: req.end_date,
                half_day: req.half_day,
                description: req.description,
                approver_id: req.approver_id,
            })
            .await
            .map_err(AppError::Internal)
    }
}
