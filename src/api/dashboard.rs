use crate::auth::auth::AuthUser;
use crate::error::AppError;
use crate::model::role::Permission;
use crate::reports::{build_dashboard, build_report};
use crate::store::RecordStore;
use crate::utils::clock::Clock;
use crate::utils::report_cache::ReportCache;
use actix_web::{HttpResponse, web};
use tracing::debug;

/// Headline counts for the landing page
#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses(
        (status = 200, description = "Dashboard counts", body = crate::reports::DashboardStats),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Reports"
)]
pub async fn dashboard(
    auth: AuthUser,
    store: web::Data<dyn RecordStore>,
    clock: web::Data<dyn Clock>,
    reports: web::Data<ReportCache>,
) -> Result<HttpResponse, AppError> {
    auth.require(Permission::ViewDashboard)?;

    if let Some(stats) = reports.dashboard().await {
        debug!("Dashboard served from cache");
        return Ok(HttpResponse::Ok().json(stats));
    }

    let generation = reports.generation();
    let stats = build_dashboard(store.get_ref(), clock.today()).await?;
    reports.put_dashboard(stats.clone(), generation).await;

    Ok(HttpResponse::Ok().json(stats))
}

/// Staffing, absenteeism and performance summary
#[utoipa::path(
    get,
    path = "/api/reports",
    responses(
        (status = 200, description = "Report summary", body = crate::reports::ReportSummary),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Reports"
)]
pub async fn report_summary(
    auth: AuthUser,
    store: web::Data<dyn RecordStore>,
    clock: web::Data<dyn Clock>,
    reports: web::Data<ReportCache>,
) -> Result<HttpResponse, AppError> {
    auth.require(Permission::ViewReports)?;

    if let Some(summary) = reports.summary().await {
        debug!("Report summary served from cache");
        return Ok(HttpResponse::Ok().json(summary));
    }

    let generation = reports.generation();
    let summary = build_report(store.get_ref(), clock.today()).await?;
    reports.put_summary(summary.clone(), generation).await;

    Ok(HttpResponse::Ok().json(summary))
}
