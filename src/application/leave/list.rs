use std::sync::Arc;

use crate::domain::auth::{Actor, permissions};
use crate::domain::leave::{LeaveApplication, LeaveFilter, LeaveRepository};
use crate::shared::error::AppError;
use crate::shared::pagination::PageParams;

/// Paginated application listing. Callers without approve/void authority
/// only ever see their own applications, whatever filter they pass.
pub struct ListLeaveUseCase {
    leave_repo: Arc<dyn LeaveRepository>,
}

impl ListLeaveUseCase {
    pub fn new(leave_repo: Arc<dyn LeaveRepository>) -> Self {
        Self { leave_repo }
    }

    pub async fn execute(
        &self,
        actor: &Actor,
        mut filter: LeaveFilter,
        page: PageParams,
    ) -> Result<(Vec<LeaveApplication>, i64), AppError> {
        if !actor.can(permissions::LEAVE_APPROVE) && !actor.can(permissions::LEAVE_VOID) {
            let own = actor
                .employee_id
                .ok_or_else(|| AppError::Forbidden("no employee profile".to_string()))?;
            filter.employee_id = Some(own);
        }

        let total = self
            .leave_repo
            .count(filter.clone())
            .await
            .map_err(AppError::Internal)?;

        let applications = self
            .leave_repo
            .find_all(filter, page.per_page(), page.offset())
            .await
            .map_err(AppError::Internal)?;

        Ok((applications, total))
    }
}
