use crate::auth::auth::AuthUser;
use crate::error::AppError;
use crate::model::employee::EmployeeView;
use crate::model::role::Permission;
use crate::store::RecordStore;
use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct EmployeeQuery {
    /// Case-insensitive match on employee number, name, email, department or position
    #[schema(example = "engineering")]
    pub search: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeListResponse {
    pub data: Vec<EmployeeView>,
    #[schema(example = 10)]
    pub total: usize,
}

/// Employee directory, newest first
#[utoipa::path(
    get,
    path = "/api/employee",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Matching employees", body = EmployeeListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Employee"
)]
pub async fn list_employees(
    auth: AuthUser,
    store: web::Data<dyn RecordStore>,
    query: web::Query<EmployeeQuery>,
) -> Result<HttpResponse, AppError> {
    auth.require(Permission::ViewDirectory)?;

    let search = query.search.as_deref().unwrap_or("");
    let data: Vec<EmployeeView> = store
        .list_employees()
        .await?
        .into_iter()
        .filter(|e| e.matches_search(search))
        .collect();

    debug!(search, matched = data.len(), "Employee directory listed");

    Ok(HttpResponse::Ok().json(EmployeeListResponse {
        total: data.len(),
        data,
    }))
}

/// Employee details
#[utoipa::path(
    get,
    path = "/api/employee/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee found", body = EmployeeView),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "error": "Employee not found",
            "code": "NOT_FOUND"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Employee"
)]
pub async fn get_employee(
    auth: AuthUser,
    store: web::Data<dyn RecordStore>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    auth.require(Permission::ViewDirectory)?;

    let employee_id = path.into_inner();
    let employee = store
        .get_employee(employee_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Employee not found".to_string()))?;

    Ok(HttpResponse::Ok().json(employee))
}
