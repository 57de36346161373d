use async_trait::async_trait;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionType {
    LeaveApplication,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::LeaveApplication => "leave_application",
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub recipient_user_id: Uuid,
    pub transaction_type: TransactionType,
    pub transaction_id: i64,
    pub message: String,
}

/// Notification collaborator. Fire-and-forget: callers log failures and
/// move on; a failed notification never rolls back the operation that
/// produced it.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: NewNotification) -> Result<(), anyhow::Error>;
}
