use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use crate::domain::auth::Actor;
use crate::domain::balance::LeaveBalanceLedger;
use crate::domain::leave::{
    LeaveApplication, LeaveRepository, LeaveStatus, StatusChange, TransitionError,
};
use crate::domain::notifications::{NewNotification, Notifier, TransactionType};
use crate::domain::users::UserRepository;
use crate::shared::error::AppError;

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct TransitionRequest {
    pub status: LeaveStatus,
    #[validate(length(max = 1000, message = "Remarks must be at most 1000 characters"))]
    pub remarks: Option<String>,
}

/// Move a leave application along one legal edge of the status machine.
///
/// The status update and its history row commit atomically; the balance
/// ledger and notification collaborators run after the commit and their
/// failures are logged, never surfaced.
pub struct TransitionLeaveUseCase {
    leave_repo: Arc<dyn LeaveRepository>,
    user_repo: Arc<dyn UserRepository>,
    ledger: Arc<dyn LeaveBalanceLedger>,
    notifier: Arc<dyn Notifier>,
}

impl TransitionLeaveUseCase {
    pub fn new(
        leave_repo: Arc<dyn LeaveRepository>,
        user_repo: Arc<dyn UserRepository>,
        ledger: Arc<dyn LeaveBalanceLedger>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            leave_repo,
            user_repo,
            ledger,
            notifier,
        }
    }

    #[tracing::instrument(skip(self, actor), fields(actor = %actor.user_id))]
    pub async fn execute(
        &self,
        application_id: i64,
        target: LeaveStatus,
        actor: &Actor,
        remarks: Option<String>,
    ) -> Result<LeaveApplication, AppError> {
        let application = self
            .leave_repo
            .find_by_id(application_id)
            .await
            .map_err(AppError::Internal)?
            .ok_or(AppError::NotFound("leave application"))?;

        application.authorize_transition(target, actor)?;

        let set_approver = match target {
            LeaveStatus::Approved | LeaveStatus::Rejected
                if application.approver_id.is_none() =>
            {
                actor.employee_id
            }
            _ => None,
        };

        let previous = application.status;
        let applied = self
            .leave_repo
            .transition(StatusChange {
                application_id,
                from: previous,
                to: target,
                actor_user_id: actor.user_id,
                set_approver,
                remarks,
            })
            .await
            .map_err(AppError::Internal)?;

        if !applied {
            return Err(AppError::InvalidTransition(TransitionError::Conflict {
                from: previous,
            }));
        }

        let updated = self
            .leave_repo
            .find_by_id(application_id)
            .await
            .map_err(AppError::Internal)?
            .ok_or(AppError::NotFound("leave application"))?;

        self.adjust_balance(&updated, previous, target).await;
        self.send_notification(&updated, target).await;

        Ok(updated)
    }

    /// Approval consumes days; voiding an approved application restores
    /// them. Any other edge leaves the ledger untouched.
    async fn adjust_balance(
        &self,
        application: &LeaveApplication,
        previous: LeaveStatus,
        target: LeaveStatus,
    ) {
        let delta = match target {
            LeaveStatus::Approved => application.total_days(),
            LeaveStatus::Void if previous == LeaveStatus::Approved => -application.total_days(),
            _ => return,
        };

        if let Err(e) = self
            .ledger
            .adjust(application.employee_id, application.leave_type_id, delta)
            .await
        {
            tracing::warn!(
                application_id = application.id,
                delta,
                error = %e,
                "leave balance adjustment failed; ledger must be reconciled out of band"
            );
        }
    }

    async fn send_notification(&self, application: &LeaveApplication, target: LeaveStatus) {
        // Cancellation informs the approver; every other transition informs
        // the owning employee.
        let recipient_employee = match target {
            LeaveStatus::Cancelled => application.approver_id,
            _ => Some(application.employee_id),
        };
        let Some(employee_id) = recipient_employee else {
            return;
        };

        let recipient = match self.user_repo.find_by_employee_id(employee_id).await {
            Ok(Some(user)) => user,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!(employee_id, error = %e, "could not resolve notification recipient");
                return;
            }
        };

        let notification = NewNotification {
            recipient_user_id: recipient.id,
            transaction_type: TransactionType::LeaveApplication,
            transaction_id: application.id,
            message: format!("Leave application #{} {}", application.id, target),
        };

        if let Err(e) = self.notifier.notify(notification).await {
            tracing::warn!(
                application_id = application.id,
                error = %e,
                "notification delivery failed"
            );
        }
    }
}
