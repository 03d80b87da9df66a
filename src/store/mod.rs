//! Record store: the persistence collaborator behind every handler and the
//! leave workflow.
//!
//! `MySqlStore` is the production implementation. Tests run against
//! `memory::MemoryStore`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use derive_more::Display;

use crate::error::AppError;
use crate::model::attendance::{AttendanceStatus, AttendanceView};
use crate::model::employee::{Employee, EmployeeView};
use crate::model::leave_request::{Decision, LeaveRequest, LeaveRequestView, LeaveStatus, NewLeaveRequest};
use crate::model::performance_review::PerformanceReviewView;
use crate::models::{NewRefreshToken, RefreshTokenRecord, UserCredentials};

#[cfg(test)]
pub mod memory;
pub mod mysql;

pub use mysql::MySqlStore;

#[derive(Debug, Display)]
pub enum StoreError {
    /// A unique constraint rejected the write.
    #[display(fmt = "duplicate record")]
    Duplicate,
    #[display(fmt = "database error: {}", _0)]
    Database(sqlx::Error),
    #[display(fmt = "{}", _0)]
    Backend(String),
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return StoreError::Duplicate;
            }
        }
        StoreError::Database(err)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate => AppError::Conflict("Record already exists".to_string()),
            other => AppError::Persistence(anyhow::Error::new(other)),
        }
    }
}

/// Filter and page window for leave listings.
#[derive(Debug, Clone, Default)]
pub struct LeaveQuery {
    pub employee_id: Option<u64>,
    pub status: Option<LeaveStatus>,
    pub limit: u64,
    pub offset: u64,
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    // ---------- employees ----------

    /// Employee record linked to an identity, if any.
    async fn find_employee_by_user(&self, user_id: u64) -> Result<Option<Employee>, StoreError>;

    async fn get_employee(&self, id: u64) -> Result<Option<EmployeeView>, StoreError>;

    /// All employees, newest first.
    async fn list_employees(&self) -> Result<Vec<EmployeeView>, StoreError>;

    // ---------- leave requests ----------

    async fn insert_leave(&self, request: NewLeaveRequest) -> Result<LeaveRequest, StoreError>;

    async fn find_leave(&self, id: u64) -> Result<Option<LeaveRequest>, StoreError>;

    /// Applies `decision` to a pending request. Returns false when the
    /// request was no longer pending (or absent), in which case nothing
    /// changed.
    async fn decide_leave(
        &self,
        id: u64,
        decision: Decision,
        approver: u64,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    async fn get_leave_view(&self, id: u64) -> Result<Option<LeaveRequestView>, StoreError>;

    /// One page of joined leave rows, newest first, plus the total count.
    async fn list_leave(&self, query: &LeaveQuery) -> Result<(Vec<LeaveRequestView>, i64), StoreError>;

    // ---------- attendance ----------

    async fn list_attendance(&self, date: NaiveDate) -> Result<Vec<AttendanceView>, StoreError>;

    /// Fails with `StoreError::Duplicate` when the employee already has a
    /// row for `date`.
    async fn check_in(&self, employee_id: u64, date: NaiveDate, time: NaiveTime) -> Result<(), StoreError>;

    /// Returns false when there is no open check-in for `date`.
    async fn check_out(&self, employee_id: u64, date: NaiveDate, time: NaiveTime) -> Result<bool, StoreError>;

    // ---------- performance reviews ----------

    async fn list_reviews(&self) -> Result<Vec<PerformanceReviewView>, StoreError>;

    // ---------- report inputs ----------

    async fn employee_departments(&self) -> Result<Vec<String>, StoreError>;

    async fn leave_statuses(&self) -> Result<Vec<LeaveStatus>, StoreError>;

    async fn attendance_statuses_since(&self, since: NaiveDate) -> Result<Vec<AttendanceStatus>, StoreError>;

    async fn review_ratings(&self) -> Result<Vec<Option<u8>>, StoreError>;

    // ---------- credentials ----------

    async fn find_user_by_username(&self, username: &str) -> Result<Option<UserCredentials>, StoreError>;

    async fn touch_last_login(&self, user_id: u64) -> Result<(), StoreError>;

    async fn store_refresh_token(&self, token: NewRefreshToken) -> Result<(), StoreError>;

    async fn find_refresh_token(&self, jti: &str) -> Result<Option<RefreshTokenRecord>, StoreError>;

    /// Idempotent; returns whether a live token was revoked.
    async fn revoke_refresh_token(&self, jti: &str) -> Result<bool, StoreError>;
}
