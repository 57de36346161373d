use async_trait::async_trait;

/// External leave-balance ledger collaborator.
///
/// The workflow calls this after a transition commits: a positive delta
/// consumes days (approval), a negative delta restores them (void of an
/// approved application). The signed delta plus the (employee, leave type)
/// key is enough for an external ledger to apply the adjustment
/// idempotently in either direction. A ledger failure never fails the
/// transition that triggered it.
#[async_trait]
pub trait LeaveBalanceLedger: Send + Sync {
    async fn adjust(
        &self,
        employee_id: i64,
        leave_type_id: i64,
        delta_used_days: f64,
    ) -> Result<(), anyhow::Error>;
}
