use crate::auth::auth::{TokenRejection, authenticate, bearer_token};
use crate::config::Config;
use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    web::Data,
};
use serde_json::json;

pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let config = req
        .app_data::<Data<Config>>()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("App config missing"))?;

    let header = match req.headers().get("Authorization") {
        Some(h) => Some(h.to_str().map_err(|_| {
            actix_web::error::ErrorUnauthorized(
                json!({"error": "Invalid Authorization header encoding"}),
            )
        })?),
        None => None,
    };

    let auth_user = match bearer_token(header).and_then(|t| authenticate(t, &config.jwt_secret)) {
        Ok(user) => user,
        Err(rejection) => {
            if !matches!(rejection, TokenRejection::Missing) {
                tracing::debug!(reason = %rejection.message(), "Rejected bearer token");
            }
            let resp = HttpResponse::Unauthorized().json(json!({
                "error": rejection.message(),
                "code": "UNAUTHORIZED"
            }));
            return Ok(req.into_response(resp.map_into_boxed_body()));
        }
    };

    req.extensions_mut().insert(auth_user);

    next.call(req).await
}
