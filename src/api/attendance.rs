use crate::auth::auth::AuthUser;
use crate::error::AppError;
use crate::model::employee::Employee;
use crate::model::role::Permission;
use crate::store::{RecordStore, StoreError};
use crate::utils::clock::Clock;
use crate::utils::report_cache::ReportCache;
use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
pub struct AttendanceQuery {
    /// Day to list; defaults to today
    #[param(value_type = Option<String>, format = "date")]
    pub date: Option<NaiveDate>,
}

async fn own_employee(auth: &AuthUser, store: &dyn RecordStore) -> Result<Employee, AppError> {
    store
        .find_employee_by_user(auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Employee record not found".to_string()))
}

/// Attendance rows for one day, ordered by check-in time
#[utoipa::path(
    get,
    path = "/api/attendance",
    params(AttendanceQuery),
    responses(
        (status = 200, description = "Attendance for the day", body = [crate::model::attendance::AttendanceView]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn list_attendance(
    auth: AuthUser,
    store: web::Data<dyn RecordStore>,
    clock: web::Data<dyn Clock>,
    query: web::Query<AttendanceQuery>,
) -> Result<HttpResponse, AppError> {
    auth.require(Permission::ViewAttendance)?;

    let date = query.date.unwrap_or_else(|| clock.today());
    let rows = store.list_attendance(date).await?;

    Ok(HttpResponse::Ok().json(rows))
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/attendance",
    responses(
        (status = 201, description = "Checked in successfully", body = Object, example = json!({
            "message": "Checked in successfully"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Caller has no employee record"),
        (status = 409, description = "Already checked in today", body = Object, example = json!({
            "error": "Already checked in today",
            "code": "CONFLICT"
        })),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    store: web::Data<dyn RecordStore>,
    clock: web::Data<dyn Clock>,
    reports: web::Data<ReportCache>,
) -> Result<HttpResponse, AppError> {
    auth.require(Permission::RecordAttendance)?;

    let employee = own_employee(&auth, store.get_ref()).await?;
    let now = clock.now();

    match store.check_in(employee.id, now.date_naive(), now.time()).await {
        Ok(()) => {}
        Err(StoreError::Duplicate) => {
            return Err(AppError::Conflict("Already checked in today".to_string()));
        }
        Err(e) => {
            error!(error = %e, employee_id = employee.id, "Check-in failed");
            return Err(e.into());
        }
    }

    info!(employee_id = employee.id, "Checked in");
    reports.invalidate();

    Ok(HttpResponse::Created().json(json!({
        "message": "Checked in successfully"
    })))
}

/// Check-out endpoint
#[utoipa::path(
    put,
    path = "/api/attendance",
    responses(
        (status = 200, description = "Checked out successfully", body = Object, example = json!({
            "message": "Checked out successfully"
        })),
        (status = 400, description = "No active check-in found for today", body = Object, example = json!({
            "error": "No active check-in found for today",
            "code": "VALIDATION_ERROR"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Caller has no employee record"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_out(
    auth: AuthUser,
    store: web::Data<dyn RecordStore>,
    clock: web::Data<dyn Clock>,
    reports: web::Data<ReportCache>,
) -> Result<HttpResponse, AppError> {
    auth.require(Permission::RecordAttendance)?;

    let employee = own_employee(&auth, store.get_ref()).await?;
    let now = clock.now();

    if !store.check_out(employee.id, now.date_naive(), now.time()).await? {
        return Err(AppError::Validation(
            "No active check-in found for today".to_string(),
        ));
    }

    info!(employee_id = employee.id, "Checked out");
    reports.invalidate();

    Ok(HttpResponse::Ok().json(json!({
        "message": "Checked out successfully"
    })))
}
