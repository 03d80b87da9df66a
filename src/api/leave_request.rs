use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::error::AppError;
use crate::model::leave_request::{Decision, LeaveRequestView, LeaveStatus};
use crate::store::RecordStore;
use crate::utils::clock::Clock;
use crate::utils::report_cache::ReportCache;
use crate::workflow::leave::{LeaveListFilter, LeaveSubmission, LeaveWorkflow};
use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Serialize, ToSchema)]
#[schema(example = json!({
    "data": [
        {
            "id": 1,
            "employee_id": 1000,
            "employee_number": "EMP-001",
            "department": "Engineering",
            "employee_name": "Jane Doe",
            "start_date": "2026-01-01",
            "end_date": "2026-01-03",
            "reason": "Family event",
            "status": "pending",
            "approved_by": null,
            "approver_name": null,
            "approved_at": null,
            "created_at": "2025-12-20T09:00:00Z"
        }
    ],
    "page": 1,
    "per_page": 10,
    "total": 1
}))]
pub struct LeaveListResponse {
    pub data: Vec<LeaveRequestView>,
    #[schema(example = 1)]
    pub page: u64,
    #[schema(example = 10)]
    pub per_page: u64,
    #[schema(example = 1)]
    pub total: i64,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct LeaveFilter {
    #[schema(example = 123)]
    /// Filter by employee ID
    pub employee_id: Option<u64>,
    #[schema(example = "pending")]
    /// Filter by leave status (pending, approved, rejected)
    pub status: Option<String>,
    #[schema(example = 1)]
    /// Pagination page number (start with 1)
    pub page: Option<u64>,
    #[schema(example = 10)]
    /// Pagination per page number
    pub per_page: Option<u64>,
}

fn workflow<'a>(
    store: &'a web::Data<dyn RecordStore>,
    clock: &'a web::Data<dyn Clock>,
    config: &web::Data<Config>,
) -> LeaveWorkflow<'a, dyn RecordStore> {
    LeaveWorkflow::new(store.get_ref(), clock.get_ref(), config.leave_notice_days)
}

fn parse_status(raw: Option<&str>) -> Result<Option<LeaveStatus>, AppError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => s
            .to_lowercase()
            .parse()
            .map(Some)
            .map_err(|_| AppError::Validation(format!("Unknown leave status '{s}'"))),
    }
}

/// Submit a leave request for the caller's employee record
#[utoipa::path(
    post,
    path = "/api/leave",
    request_body(
        content = LeaveSubmission,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Leave request submitted", body = crate::model::leave_request::LeaveRequest),
        (status = 400, description = "Blank reason, inverted dates or less than a week's notice", body = Object, example = json!({
            "error": "Leave requests must be submitted at least one week in advance",
            "code": "VALIDATION_ERROR"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Caller has no employee record")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn create_leave(
    auth: AuthUser,
    store: web::Data<dyn RecordStore>,
    clock: web::Data<dyn Clock>,
    config: web::Data<Config>,
    reports: web::Data<ReportCache>,
    payload: web::Json<LeaveSubmission>,
) -> Result<HttpResponse, AppError> {
    let created = workflow(&store, &clock, &config)
        .submit(&auth, payload.into_inner())
        .await?;

    reports.invalidate();
    Ok(HttpResponse::Created().json(created))
}

async fn decide(
    auth: AuthUser,
    store: web::Data<dyn RecordStore>,
    clock: web::Data<dyn Clock>,
    config: web::Data<Config>,
    reports: web::Data<ReportCache>,
    leave_id: u64,
    decision: Decision,
) -> Result<HttpResponse, AppError> {
    let decided = workflow(&store, &clock, &config)
        .decide(leave_id, decision, &auth)
        .await?;

    reports.invalidate();
    Ok(HttpResponse::Ok().json(decided))
}

/// Approve a pending leave request (department head, HR, admin)
#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/approve",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to approve")
    ),
    responses(
        (status = 200, description = "Leave approved (or already approved)", body = crate::model::leave_request::LeaveRequest),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Role may not decide leave"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Leave request was already rejected")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn approve_leave(
    auth: AuthUser,
    store: web::Data<dyn RecordStore>,
    clock: web::Data<dyn Clock>,
    config: web::Data<Config>,
    reports: web::Data<ReportCache>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    decide(auth, store, clock, config, reports, path.into_inner(), Decision::Approved).await
}

/// Reject a pending leave request (department head, HR, admin)
#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/reject",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to reject")
    ),
    responses(
        (status = 200, description = "Leave rejected (or already rejected)", body = crate::model::leave_request::LeaveRequest),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Role may not decide leave"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Leave request was already approved")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn reject_leave(
    auth: AuthUser,
    store: web::Data<dyn RecordStore>,
    clock: web::Data<dyn Clock>,
    config: web::Data<Config>,
    reports: web::Data<ReportCache>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    decide(auth, store, clock, config, reports, path.into_inner(), Decision::Rejected).await
}

/// Leave request details
#[utoipa::path(
    get,
    path = "/api/leave/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to fetch")
    ),
    responses(
        (status = 200, description = "Leave request found", body = LeaveRequestView),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Leave request not found or not visible to the caller")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    store: web::Data<dyn RecordStore>,
    clock: web::Data<dyn Clock>,
    config: web::Data<Config>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let view = workflow(&store, &clock, &config)
        .get(&auth, path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(view))
}

/// Paginated leave requests, newest first. Employees only see their own.
#[utoipa::path(
    get,
    path = "/api/leave",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Paginated leave list", body = LeaveListResponse),
        (status = 400, description = "Unknown status filter"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn leave_list(
    auth: AuthUser,
    store: web::Data<dyn RecordStore>,
    clock: web::Data<dyn Clock>,
    config: web::Data<Config>,
    query: web::Query<LeaveFilter>,
) -> Result<HttpResponse, AppError> {
    let filter = LeaveListFilter {
        employee_id: query.employee_id,
        status: parse_status(query.status.as_deref())?,
        page: query.page,
        per_page: query.per_page,
    };

    let page = workflow(&store, &clock, &config).list(&auth, filter).await?;

    Ok(HttpResponse::Ok().json(LeaveListResponse {
        data: page.rows,
        page: page.page,
        per_page: page.per_page,
        total: page.total,
    }))
}
