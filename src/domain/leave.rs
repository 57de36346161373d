use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::domain::auth::{Actor, permissions};

/// Status of a leave application.
///
/// `UnderApproval` is the only non-terminal status. Every other status is
/// terminal: once reached, the only legal move left is the admin override
/// to `Void`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LeaveStatus {
    UnderApproval,
    Approved,
    Rejected,
    Cancelled,
    Void,
}

impl LeaveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaveStatus::UnderApproval => "under_approval",
            LeaveStatus::Approved => "approved",
            LeaveStatus::Rejected => "rejected",
            LeaveStatus::Cancelled => "cancelled",
            LeaveStatus::Void => "void",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, LeaveStatus::UnderApproval)
    }
}

impl fmt::Display for LeaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeaveStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "under_approval" => Ok(LeaveStatus::UnderApproval),
            "approved" => Ok(LeaveStatus::Approved),
            "rejected" => Ok(LeaveStatus::Rejected),
            "cancelled" => Ok(LeaveStatus::Cancelled),
            "void" => Ok(LeaveStatus::Void),
            other => Err(anyhow::anyhow!("unknown leave status: {}", other)),
        }
    }
}

/// Why a requested status change was refused.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("status is {from}, a terminal state; only a void override is possible")]
    Terminal { from: LeaveStatus, to: LeaveStatus },
    #[error("no transition from {from} to {to}")]
    IllegalEdge { from: LeaveStatus, to: LeaveStatus },
    #[error("actor is not authorized to {action} this application")]
    NotAuthorized { action: &'static str },
    #[error("application was modified concurrently; status is no longer {from}")]
    Conflict { from: LeaveStatus },
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct LeaveApplication {
    pub id: i64,
    pub employee_id: i64,
    pub leave_type_id: i64,
    pub start_date: Date,
    pub end_date: Date,
    pub half_day: bool,
    pub description: Option<String>,
    pub status: LeaveStatus,
    /// Employee id of the assigned approver, if one has been assigned.
    pub approver_id: Option<i64>,
    #[serde(with = "time::serde::iso8601")]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::iso8601")]
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: OffsetDateTime,
}

impl LeaveApplication {
    /// Inclusive day span of the application; a half-day application
    /// counts as 0.5.
    pub fn total_days(&self) -> f64 {
        if self.half_day {
            return 0.5;
        }
        ((self.end_date - self.start_date).whole_days() + 1) as f64
    }

    /// Check that `target` is reachable from the current status and that
    /// `actor` holds the authority for that edge.
    ///
    /// Legal edges:
    ///   UnderApproval -> Approved | Rejected   (assigned approver)
    ///   UnderApproval -> Cancelled             (owning employee)
    ///   any != Void   -> Void                  (leave.void permission)
    ///
    /// When no approver is assigned yet, an actor holding `leave.approve`
    /// may take the approve/reject edge and becomes the recorded approver.
    pub fn authorize_transition(
        &self,
        target: LeaveStatus,
        actor: &Actor,
    ) -> Result<(), TransitionError> {
        let from = self.status;

        if target == LeaveStatus::UnderApproval {
            return Err(TransitionError::IllegalEdge { from, to: target });
        }
        if from == LeaveStatus::Void
            || (from.is_terminal() && target != LeaveStatus::Void)
        {
            return Err(TransitionError::Terminal { from, to: target });
        }

        match target {
            LeaveStatus::Approved | LeaveStatus::Rejected => {
                let action = if target == LeaveStatus::Approved {
                    "approve"
                } else {
                    "reject"
                };
                match self.approver_id {
                    Some(approver) if actor.employee_id == Some(approver) => Ok(()),
                    Some(_) => Err(TransitionError::NotAuthorized { action }),
                    None if actor.can(permissions::LEAVE_APPROVE) => Ok(()),
                    None => Err(TransitionError::NotAuthorized { action }),
                }
            }
            LeaveStatus::Cancelled => {
                if actor.employee_id == Some(self.employee_id) {
                    Ok(())
                } else {
                    Err(TransitionError::NotAuthorized { action: "cancel" })
                }
            }
            LeaveStatus::Void => {
                if actor.can(permissions::LEAVE_VOID) {
                    Ok(())
                } else {
                    Err(TransitionError::NotAuthorized { action: "void" })
                }
            }
            LeaveStatus::UnderApproval => unreachable!("rejected above"),
        }
    }
}

/// Append-only record of a single status transition.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct LeaveApplicationHistory {
    pub id: i64,
    pub application_id: i64,
    /// The status the application was changed *to*.
    pub status: LeaveStatus,
    pub actor_user_id: Uuid,
    pub remarks: Option<String>,
    #[serde(with = "time::serde::iso8601")]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewLeaveApplication {
    pub employee_id: i64,
    pub leave_type_id: i64,
    pub start_date: Date,
    pub end_date: Date,
    pub half_day: bool,
    pub description: Option<String>,
    pub approver_id: Option<i64>,
}

/// A validated status change, ready to be persisted atomically.
///
/// `from` is the status the caller observed; the repository must apply the
/// change only if the row still carries it, so concurrent transitions on
/// the same application serialize.
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub application_id: i64,
    pub from: LeaveStatus,
    pub to: LeaveStatus,
    pub actor_user_id: Uuid,
    /// Approver to record when the edge assigns one (approve/reject with no
    /// approver previously set).
    pub set_approver: Option<i64>,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct LeaveFilter {
    pub employee_id: Option<i64>,
    pub status: Option<LeaveStatus>,
}

#[async_trait]
pub trait LeaveRepository: Send + Sync {
    async fn create(&self, new: NewLeaveApplication) -> Result<LeaveApplication, anyhow::Error>;
    async fn find_by_id(&self, id: i64) -> Result<Option<LeaveApplication>, anyhow::Error>;
    async fn find_all(
        &self,
        filter: LeaveFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<LeaveApplication>, anyhow::Error>;
    async fn count(&self, filter: LeaveFilter) -> Result<i64, anyhow::Error>;
    async fn history(
        &self,
        application_id: i64,
    ) -> Result<Vec<LeaveApplicationHistory>, anyhow::Error>;

    /// Apply a status change and append its history row in one transaction.
    ///
    /// Returns `false` when the row no longer carries `change.from` (a
    /// concurrent transition won the race); nothing is written in that case.
    async fn transition(&self, change: StatusChange) -> Result<bool, anyhow::Error>;
}
