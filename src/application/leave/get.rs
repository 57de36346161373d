use serde::Serialize;
use std::sync::Arc;

use crate::domain::auth::{Actor, permissions};
use crate::domain::leave::{LeaveApplication, LeaveApplicationHistory, LeaveRepository};
use crate::shared::error::AppError;

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct LeaveApplicationDetail {
    #[serde(flatten)]
    pub application: LeaveApplication,
    /// Transition trail, oldest first.
    pub history: Vec<LeaveApplicationHistory>,
}

/// Fetch one application with its full audit trail. Visible to the owning
/// employee, the assigned approver, and anyone who can approve or void.
pub struct GetLeaveUseCase {
    leave_repo: Arc<dyn LeaveRepository>,
}

impl GetLeaveUseCase {
    pub fn new(leave_repo: Arc<dyn LeaveRepository>) -> Self {
        Self { leave_repo }
    }

    pub async fn execute(
        &self,
        application_id: i64,
        actor: &Actor,
    ) -> Result<LeaveApplicationDetail, AppError> {
        let application = self
            .leave_repo
            .find_by_id(application_id)
            .await
            .map_err(AppError::Internal)?
            .ok_or(AppError::NotFound("leave application"))?;

        let involved = actor.employee_id == Some(application.employee_id)
            || (application.approver_id.is_some()
                && actor.employee_id == application.approver_id);
        if !involved
            && !actor.can(permissions::LEAVE_APPROVE)
            && !actor.can(permissions::LEAVE_VOID)
        {
            return Err(AppError::Forbidden(
                "not a participant in this application".to_string(),
            ));
        }

        let history = self
            .leave_repo
            .history(application_id)
            .await
            .map_err(AppError::Internal)?;

        Ok(LeaveApplicationDetail {
            application,
            history,
        })
    }
}
