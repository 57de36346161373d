//! In-memory repository doubles used by use-case tests. They mirror the
//! concurrency semantics of the Postgres implementations: status changes
//! and refresh-token rotation are compare-and-swap on the stored value.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::balance::LeaveBalanceLedger;
use crate::domain::leave::{
    LeaveApplication, LeaveApplicationHistory, LeaveFilter, LeaveRepository, LeaveStatus,
    NewLeaveApplication, StatusChange,
};
use crate::domain::notifications::{NewNotification, Notifier};
use crate::domain::users::{NewUser, User, UserAccess, UserRepository};

#[derive(Clone, Default)]
pub struct MockUserRepository {
    users: Arc<Mutex<Vec<User>>>,
    access: Arc<Mutex<HashMap<Uuid, UserAccess>>>,
}

impl MockUserRepository {
    pub fn add_user(&self, user: User, access: UserAccess) {
        self.access.lock().unwrap().insert(user.id, access);
        self.users.lock().unwrap().push(user);
    }

    pub fn stored_refresh_token(&self, user_id: Uuid) -> Option<(String, OffsetDateTime)> {
        let users = self.users.lock().unwrap();
        let user = users.iter().find(|u| u.id == user_id)?;
        Some((
            user.refresh_token_hash.clone()?,
            user.refresh_token_expires_at?,
        ))
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn create(&self, new_user: NewUser) -> Result<User> {
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
            employee_id: new_user.employee_id,
            is_active: true,
            is_void: false,
            refresh_token_hash: None,
            refresh_token_expires_at: None,
            created_at: now,
            updated_at: now,
        };
        self.access.lock().unwrap().insert(
            user.id,
            UserAccess {
                roles: new_user.roles,
                permissions: vec![],
            },
        );
        self.users.lock().unwrap().push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_employee_id(&self, employee_id: i64) -> Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.employee_id == Some(employee_id))
            .cloned())
    }

    async fn access(&self, user_id: Uuid) -> Result<UserAccess> {
        Ok(self
            .access
            .lock()
            .unwrap()
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn store_refresh_token(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: OffsetDateTime,
    ) -> Result<()> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.id == user_id) {
            user.refresh_token_hash = Some(token_hash.to_string());
            user.refresh_token_expires_at = Some(expires_at);
        }
        Ok(())
    }

    async fn rotate_refresh_token(
        &self,
        old_hash: &str,
        new_hash: &str,
        expires_at: OffsetDateTime,
    ) -> Result<Option<User>> {
        let mut users = self.users.lock().unwrap();
        let now = OffsetDateTime::now_utc();
        let user = users.iter_mut().find(|u| {
            u.refresh_token_hash.as_deref() == Some(old_hash)
                && u.refresh_token_expires_at.is_some_and(|exp| exp > now)
                && u.is_active
                && !u.is_void
        });
        match user {
            Some(user) => {
                user.refresh_token_hash = Some(new_hash.to_string());
                user.refresh_token_expires_at = Some(expires_at);
                Ok(Some(user.clone()))
            }
            None => Ok(None),
        }
    }

    async fn clear_refresh_token(&self, user_id: Uuid) -> Result<()> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.id == user_id) {
            user.refresh_token_hash = None;
            user.refresh_token_expires_at = None;
        }
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MockLeaveRepository {
    applications: Arc<Mutex<Vec<LeaveApplication>>>,
    history: Arc<Mutex<Vec<LeaveApplicationHistory>>>,
}

impl MockLeaveRepository {
    /// Seed an existing application, bypassing `create`.
    pub fn add_application(&self, application: LeaveApplication) {
        self.applications.lock().unwrap().push(application);
    }

    pub fn history_rows(&self, application_id: i64) -> Vec<LeaveApplicationHistory> {
        self.history
            .lock()
            .unwrap()
            .iter()
            .filter(|h| h.application_id == application_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl LeaveRepository for MockLeaveRepository {
    async fn create(&self, new: NewLeaveApplication) -> Result<LeaveApplication> {
        let mut applications = self.applications.lock().unwrap();
        let now = OffsetDateTime::now_utc();
        let application = LeaveApplication {
            id: applications.len() as i64 + 1,
            employee_id: new.employee_id,
            leave_type_id: new.leave_type_id,
            start_date: new.start_date,
            end_date: new.end_date,
            half_day: new.half_day,
            description: new.description,
            status: LeaveStatus::UnderApproval,
            approver_id: new.approver_id,
            created_at: now,
            updated_at: now,
        };
        applications.push(application.clone());
        Ok(application)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<LeaveApplication>> {
        Ok(self
            .applications
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }

    async fn find_all(
        &self,
        filter: LeaveFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<LeaveApplication>> {
        let applications = self.applications.lock().unwrap();
        Ok(applications
            .iter()
            .filter(|a| filter.employee_id.is_none_or(|e| a.employee_id == e))
            .filter(|a| filter.status.is_none_or(|s| a.status == s))
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn count(&self, filter: LeaveFilter) -> Result<i64> {
        let applications = self.applications.lock().unwrap();
        Ok(applications
            .iter()
            .filter(|a| filter.employee_id.is_none_or(|e| a.employee_id == e))
            .filter(|a| filter.status.is_none_or(|s| a.status == s))
            .count() as i64)
    }

    async fn history(&self, application_id: i64) -> Result<Vec<LeaveApplicationHistory>> {
        Ok(self.history_rows(application_id))
    }

    async fn transition(&self, change: StatusChange) -> Result<bool> {
        let mut applications = self.applications.lock().unwrap();
        let Some(application) = applications.iter_mut().find(|a| a.id == change.application_id)
        else {
            return Ok(false);
        };
        // Same CAS rule as the SQL implementation.
        if application.status != change.from {
            return Ok(false);
        }
        application.status = change.to;
        if let Some(approver) = change.set_approver {
            application.approver_id.get_or_insert(approver);
        }
        application.updated_at = OffsetDateTime::now_utc();

        let mut history = self.history.lock().unwrap();
        let next_id = history.len() as i64 + 1;
        history.push(LeaveApplicationHistory {
            id: next_id,
            application_id: change.application_id,
            status: change.to,
            actor_user_id: change.actor_user_id,
            remarks: change.remarks,
            created_at: OffsetDateTime::now_utc(),
        });
        Ok(true)
    }
}

#[derive(Clone, Default)]
pub struct MockLeaveBalanceLedger {
    adjustments: Arc<Mutex<Vec<(i64, i64, f64)>>>,
    fail: bool,
}

impl MockLeaveBalanceLedger {
    pub fn failing() -> Self {
        Self {
            adjustments: Arc::default(),
            fail: true,
        }
    }

    pub fn adjustments(&self) -> Vec<(i64, i64, f64)> {
        self.adjustments.lock().unwrap().clone()
    }
}

#[async_trait]
impl LeaveBalanceLedger for MockLeaveBalanceLedger {
    async fn adjust(
        &self,
        employee_id: i64,
        leave_type_id: i64,
        delta_used_days: f64,
    ) -> Result<()> {
        if self.fail {
            return Err(anyhow::anyhow!("ledger unavailable"));
        }
        self.adjustments
            .lock()
            .unwrap()
            .push((employee_id, leave_type_id, delta_used_days));
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MockNotifier {
    sent: Arc<Mutex<Vec<NewNotification>>>,
    fail: bool,
}

impl MockNotifier {
    pub fn failing() -> Self {
        Self {
            sent: Arc::default(),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<NewNotification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn notify(&self, notification: NewNotification) -> Result<()> {
        if self.fail {
            return Err(anyhow::anyhow!("notifier unavailable"));
        }
        self.sent.lock().unwrap().push(notification);
        Ok(())
    }
}
