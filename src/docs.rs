use crate::api::employee::{EmployeeListResponse, EmployeeQuery};
use crate::api::leave_request::{LeaveFilter, LeaveListResponse};
use crate::auth::handlers::{LoginResponse, MeResponse};
use crate::model::attendance::{AttendanceStatus, AttendanceView};
use crate::model::employee::EmployeeView;
use crate::model::leave_request::{LeaveRequest, LeaveRequestView, LeaveStatus};
use crate::model::performance_review::PerformanceReviewView;
use crate::model::role::{Permission, Role};
use crate::models::LoginReqDto;
use crate::reports::{DashboardStats, ReportSummary};
use crate::workflow::leave::LeaveSubmission;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "StaffTrack API",
        version = "1.0.0",
        description = r#"
## StaffTrack

Backend for a human-resources dashboard.

### Key Features
- **Leave Management**
  - Submit leave at least one week ahead; department heads, HR and admins approve or reject
- **Employee Directory**
  - Search employees by number, name, email, department or position
- **Attendance**
  - Daily check-in and check-out, per-day attendance sheet
- **Performance Reviews**
- **Dashboard & Reports**
  - Headcount, pending leave, attendance rate, average rating

### Security
All `/api` endpoints require a **JWT Bearer** access token obtained from `/auth/login`.
Role permissions are listed by `GET /api/me`.

### Errors
Failures return `{"error": <message>, "code": <CODE>}`.
"#,
    ),
    paths(
        crate::auth::handlers::login,
        crate::auth::handlers::refresh_token,
        crate::auth::handlers::logout,
        crate::auth::handlers::me,

        crate::api::leave_request::leave_list,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::create_leave,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave,

        crate::api::employee::list_employees,
        crate::api::employee::get_employee,

        crate::api::attendance::list_attendance,
        crate::api::attendance::check_in,
        crate::api::attendance::check_out,

        crate::api::performance::list_reviews,

        crate::api::dashboard::dashboard,
        crate::api::dashboard::report_summary
    ),
    components(
        schemas(
            LoginReqDto,
            LoginResponse,
            MeResponse,
            Role,
            Permission,
            LeaveSubmission,
            LeaveRequest,
            LeaveRequestView,
            LeaveStatus,
            LeaveFilter,
            LeaveListResponse,
            EmployeeView,
            EmployeeQuery,
            EmployeeListResponse,
            AttendanceView,
            AttendanceStatus,
            PerformanceReviewView,
            DashboardStats,
            ReportSummary
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Login, token rotation and identity"),
        (name = "Leave", description = "Leave request workflow"),
        (name = "Employee", description = "Employee directory"),
        (name = "Attendance", description = "Attendance APIs"),
        (name = "Performance", description = "Performance reviews"),
        (name = "Reports", description = "Dashboard and report aggregates"),
    )
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        // schemas above guarantee a components section
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
