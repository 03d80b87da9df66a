//! Leave request workflow: submission with the advance-notice rule and
//! role-gated approval/rejection.
//!
//! `pending` is the only non-terminal status. A repeated decision that
//! matches the recorded one is answered with the stored request; an
//! opposite decision is a conflict.

use chrono::{Days, NaiveDate};
use serde::Deserialize;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::error::AppError;
use crate::model::leave_request::{Decision, LeaveRequest, LeaveRequestView, LeaveStatus, NewLeaveRequest};
use crate::model::role::Permission;
use crate::store::{LeaveQuery, RecordStore};
use crate::utils::clock::Clock;

pub const DEFAULT_NOTICE_DAYS: i64 = 7;
pub const MAX_NOTICE_DAYS: i64 = 365;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LeaveSubmission {
    #[schema(example = "2026-11-02", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-11-04", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "Family wedding")]
    pub reason: String,
}

/// One page of leave rows.
#[derive(Debug)]
pub struct LeavePage {
    pub rows: Vec<LeaveRequestView>,
    pub total: i64,
    pub page: u64,
    pub per_page: u64,
}

#[derive(Debug, Clone, Default)]
pub struct LeaveListFilter {
    pub employee_id: Option<u64>,
    pub status: Option<LeaveStatus>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

fn notice_message(notice_days: i64) -> String {
    if notice_days == 7 {
        "Leave requests must be submitted at least one week in advance".to_string()
    } else {
        format!("Leave requests must be submitted at least {notice_days} days in advance")
    }
}

/// Checks a submission against `today`. Pure; nothing is read or written.
pub fn validate_submission(
    submission: &LeaveSubmission,
    today: NaiveDate,
    notice_days: i64,
) -> Result<(), AppError> {
    if submission.reason.trim().is_empty() {
        return Err(AppError::Validation("A reason is required".to_string()));
    }

    if submission.end_date < submission.start_date {
        return Err(AppError::Validation(
            "end_date cannot be before start_date".to_string(),
        ));
    }

    let earliest = today.checked_add_days(Days::new(notice_days.max(0) as u64));
    if earliest.is_none_or(|earliest| submission.start_date < earliest) {
        return Err(AppError::Validation(notice_message(notice_days)));
    }

    Ok(())
}

pub struct LeaveWorkflow<'a, S: ?Sized> {
    store: &'a S,
    clock: &'a dyn Clock,
    notice_days: i64,
}

impl<'a, S> LeaveWorkflow<'a, S>
where
    S: RecordStore + ?Sized,
{
    pub fn new(store: &'a S, clock: &'a dyn Clock, notice_days: i64) -> Self {
        Self {
            store,
            clock,
            notice_days,
        }
    }

    #[instrument(name = "leave_submit", skip_all, fields(user_id = actor.user_id))]
    pub async fn submit(
        &self,
        actor: &AuthUser,
        submission: LeaveSubmission,
    ) -> Result<LeaveRequest, AppError> {
        actor.require(Permission::SubmitLeave)?;

        let now = self.clock.now();
        validate_submission(&submission, now.date_naive(), self.notice_days)?;

        let employee = self
            .store
            .find_employee_by_user(actor.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Employee record not found".to_string()))?;

        let created = self
            .store
            .insert_leave(NewLeaveRequest {
                employee_id: employee.id,
                start_date: submission.start_date,
                end_date: submission.end_date,
                reason: submission.reason.trim().to_string(),
                created_at: now,
            })
            .await?;

        info!(leave_id = created.id, employee_id = employee.id, "Leave request submitted");
        Ok(created)
    }

    #[instrument(name = "leave_decide", skip_all, fields(leave_id = request_id, user_id = actor.user_id, ?decision))]
    pub async fn decide(
        &self,
        request_id: u64,
        decision: Decision,
        actor: &AuthUser,
    ) -> Result<LeaveRequest, AppError> {
        actor.require(Permission::DecideLeave)?;

        let current = self.load(request_id).await?;
        if !current.is_pending() {
            return settled(current, decision);
        }

        let at = self.clock.now();
        if self
            .store
            .decide_leave(request_id, decision, actor.user_id, at)
            .await?
        {
            info!(status = %decision.status(), "Leave request decided");
            return self.load(request_id).await;
        }

        // Another decision landed between the read and the guarded update.
        warn!("Leave request was decided concurrently");
        settled(self.load(request_id).await?, decision)
    }

    /// Leave rows visible to `actor`: everything with `ViewAllLeave`,
    /// otherwise only the actor's own requests.
    pub async fn list(&self, actor: &AuthUser, filter: LeaveListFilter) -> Result<LeavePage, AppError> {
        let per_page = filter.per_page.unwrap_or(10).clamp(1, 100);
        let page = filter.page.unwrap_or(1).max(1);

        let employee_id = if actor.can(Permission::ViewAllLeave) {
            filter.employee_id
        } else {
            match self.store.find_employee_by_user(actor.user_id).await? {
                Some(own) if filter.employee_id.is_none_or(|id| id == own.id) => Some(own.id),
                _ => {
                    return Ok(LeavePage {
                        rows: Vec::new(),
                        total: 0,
                        page,
                        per_page,
                    });
                }
            }
        };

        let (rows, total) = self
            .store
            .list_leave(&LeaveQuery {
                employee_id,
                status: filter.status,
                limit: per_page,
                offset: (page - 1).saturating_mul(per_page),
            })
            .await?;

        Ok(LeavePage {
            rows,
            total,
            page,
            per_page,
        })
    }

    pub async fn get(&self, actor: &AuthUser, request_id: u64) -> Result<LeaveRequestView, AppError> {
        let not_found = || AppError::NotFound("Leave request not found".to_string());

        let view = self
            .store
            .get_leave_view(request_id)
            .await?
            .ok_or_else(not_found)?;

        if actor.can(Permission::ViewAllLeave) {
            return Ok(view);
        }

        match self.store.find_employee_by_user(actor.user_id).await? {
            Some(own) if own.id == view.employee_id => Ok(view),
            _ => Err(not_found()),
        }
    }

    async fn load(&self, request_id: u64) -> Result<LeaveRequest, AppError> {
        self.store
            .find_leave(request_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Leave request not found".to_string()))
    }
}

fn settled(current: LeaveRequest, decision: Decision) -> Result<LeaveRequest, AppError> {
    if current.status == decision.status() {
        Ok(current)
    } else {
        Err(AppError::Conflict(format!(
            "Leave request has already been {}",
            current.status
        )))
    }
}
