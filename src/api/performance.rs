use crate::auth::auth::AuthUser;
use crate::error::AppError;
use crate::model::role::Permission;
use crate::store::RecordStore;
use actix_web::{HttpResponse, web};

/// Performance reviews, most recent first
#[utoipa::path(
    get,
    path = "/api/performance",
    responses(
        (status = 200, description = "Performance reviews", body = [crate::model::performance_review::PerformanceReviewView]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Performance"
)]
pub async fn list_reviews(
    auth: AuthUser,
    store: web::Data<dyn RecordStore>,
) -> Result<HttpResponse, AppError> {
    auth.require(Permission::ViewReviews)?;

    Ok(HttpResponse::Ok().json(store.list_reviews().await?))
}
