use crate::{
    auth::{
        auth::{AuthUser, bearer_token},
        jwt::{generate_access_token, generate_refresh_token, verify_token},
        password::verify_password,
    },
    config::Config,
    model::role::{Permission, Role},
    models::{LoginReqDto, NewRefreshToken, TokenType},
    store::RecordStore,
};
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Serialize, ToSchema)]
pub struct MeResponse {
    pub user_id: u64,
    pub username: String,
    pub role: Role,
    #[schema(nullable = true)]
    pub employee_id: Option<u64>,
    pub permissions: Vec<Permission>,
}

/// Issues and persists a fresh access/refresh pair.
async fn issue_tokens(
    store: &dyn RecordStore,
    config: &Config,
    user_id: u64,
    username: String,
    role: u8,
    employee_id: Option<u64>,
) -> Result<LoginResponse, HttpResponse> {
    let access_token = generate_access_token(
        user_id,
        username.clone(),
        role,
        employee_id,
        &config.jwt_secret,
        config.access_token_ttl,
    )
    .map_err(|e| {
        error!(error = %e, user_id, "Failed to sign access token");
        HttpResponse::InternalServerError().finish()
    })?;

    let (refresh_token, refresh_claims) = generate_refresh_token(
        user_id,
        username,
        role,
        employee_id,
        &config.jwt_secret,
        config.refresh_token_ttl,
    )
    .map_err(|e| {
        error!(error = %e, user_id, "Failed to sign refresh token");
        HttpResponse::InternalServerError().finish()
    })?;

    debug!(user_id, jti = %refresh_claims.jti, "Storing refresh token");

    let expires_at = Utc
        .timestamp_opt(refresh_claims.exp as i64, 0)
        .single()
        .unwrap_or_else(Utc::now);

    store
        .store_refresh_token(NewRefreshToken {
            user_id,
            jti: refresh_claims.jti,
            expires_at,
        })
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to store refresh token");
            HttpResponse::InternalServerError().finish()
        })?;

    Ok(LoginResponse {
        access_token,
        refresh_token,
    })
}

/// Exchange username and password for an access/refresh token pair
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 400, description = "Username or password missing"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
#[instrument(
    name = "auth_login",
    skip(store, config, user),
    fields(username = %user.username)
)]
pub async fn login(
    user: web::Json<LoginReqDto>,
    store: web::Data<dyn RecordStore>,
    config: web::Data<Config>,
) -> impl Responder {
    info!("Login request received");

    if user.username.trim().is_empty() || user.password.is_empty() {
        info!("Validation failed: empty username or password");
        return HttpResponse::BadRequest().body("Username or password required");
    }

    let db_user = match store.find_user_by_username(user.username.trim()).await {
        Ok(Some(found)) => {
            debug!(user_id = found.id, "User found");
            found
        }
        Ok(None) => {
            info!("Invalid credentials: user not found");
            return HttpResponse::Unauthorized().body("Invalid credentials");
        }
        Err(e) => {
            error!(error = %e, "Database error while fetching user");
            return HttpResponse::InternalServerError().finish();
        }
    };

    if let Err(e) = verify_password(&user.password, &db_user.password) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return HttpResponse::Unauthorized().body("Invalid credentials");
    }

    let employee_id = match store.find_employee_by_user(db_user.id).await {
        Ok(employee) => employee.map(|e| e.id),
        Err(e) => {
            error!(error = %e, "Failed to resolve employee record");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let tokens = match issue_tokens(
        store.get_ref(),
        &config,
        db_user.id,
        db_user.username.clone(),
        db_user.role_id,
        employee_id,
    )
    .await
    {
        Ok(tokens) => tokens,
        Err(resp) => return resp,
    };

    if let Err(e) = store.touch_last_login(db_user.id).await {
        // not fatal for the login itself
        warn!(error = %e, "Failed to update last_login_at");
    }

    info!("Login successful");
    HttpResponse::Ok().json(tokens)
}

fn refresh_claims(req: &HttpRequest, config: &Config) -> Option<crate::models::Claims> {
    let header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());
    let token = bearer_token(header).ok()?;
    let claims = verify_token(token, &config.jwt_secret).ok()?;
    (claims.token_type == TokenType::Refresh).then_some(claims)
}

/// Rotate a refresh token
#[utoipa::path(
    post,
    path = "/auth/refresh",
    responses(
        (status = 200, description = "New token pair", body = LoginResponse),
        (status = 401, description = "Refresh token missing, revoked or invalid")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn refresh_token(
    req: HttpRequest,
    store: web::Data<dyn RecordStore>,
    config: web::Data<Config>,
) -> impl Responder {
    let claims = match refresh_claims(&req, &config) {
        Some(c) => c,
        None => return HttpResponse::Unauthorized().finish(),
    };

    match store.find_refresh_token(&claims.jti).await {
        Ok(Some(record)) if !record.revoked && record.user_id == claims.user_id => {
            debug!(token_id = record.id, user_id = record.user_id, "Rotating refresh token");
        }
        Ok(_) => return HttpResponse::Unauthorized().finish(),
        Err(e) => {
            error!(error = %e, "Failed to look up refresh token");
            return HttpResponse::InternalServerError().finish();
        }
    }

    match store.revoke_refresh_token(&claims.jti).await {
        Ok(true) => {}
        // lost a race with another refresh of the same token
        Ok(false) => return HttpResponse::Unauthorized().finish(),
        Err(e) => {
            error!(error = %e, "Failed to revoke refresh token");
            return HttpResponse::InternalServerError().finish();
        }
    }

    match issue_tokens(
        store.get_ref(),
        &config,
        claims.user_id,
        claims.sub,
        claims.role,
        claims.employee_id,
    )
    .await
    {
        Ok(tokens) => HttpResponse::Ok().json(tokens),
        Err(resp) => resp,
    }
}

/// Revoke a refresh token
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses((status = 204, description = "Logged out (also when the token was unknown)")),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn logout(
    req: HttpRequest,
    store: web::Data<dyn RecordStore>,
    config: web::Data<Config>,
) -> impl Responder {
    if let Some(claims) = refresh_claims(&req, &config) {
        if let Err(e) = store.revoke_refresh_token(&claims.jti).await {
            error!(error = %e, "Failed to revoke refresh token on logout");
        }
    }

    HttpResponse::NoContent().finish()
}

/// Acting user, role and granted permissions
#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "Current identity", body = MeResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn me(auth: AuthUser) -> impl Responder {
    HttpResponse::Ok().json(MeResponse {
        user_id: auth.user_id,
        username: auth.username,
        role: auth.role,
        employee_id: auth.employee_id,
        permissions: auth.role.permissions().to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::auth::authenticate;
    use crate::auth::password::hash_password;
    use crate::store::memory::MemoryStore;
    use crate::test_support::test_config;
    use actix_web::{App, http::StatusCode};
    use actix_web::test::{TestRequest, call_and_read_body_json, call_service, init_service};
    use std::sync::Arc;

    fn app_data() -> (Arc<MemoryStore>, web::Data<dyn RecordStore>, web::Data<Config>) {
        let store = Arc::new(MemoryStore::seeded());
        store.add_user(20, "rita", &hash_password("pa55word").unwrap(), Role::Hr, "Rita Hr");
        store.add_employee(120, 20, "EMP-020", "People", "Recruiter", 9);
        let dyn_store: Arc<dyn RecordStore> = store.clone();
        (store, web::Data::from(dyn_store), web::Data::new(test_config()))
    }

    #[actix_web::test]
    async fn login_refresh_logout_round() {
        let (store, data, config) = app_data();
        let app = init_service(
            App::new()
                .app_data(data)
                .app_data(config.clone())
                .route("/auth/login", web::post().to(login))
                .route("/auth/refresh", web::post().to(refresh_token))
                .route("/auth/logout", web::post().to(logout)),
        )
        .await;

        let req = TestRequest::post()
            .uri("/auth/login")
            .set_json(serde_json::json!({"username": "rita", "password": "pa55word"}))
            .to_request();
        let tokens: LoginResponse = call_and_read_body_json(&app, req).await;

        let user = authenticate(&tokens.access_token, &config.jwt_secret).unwrap();
        assert_eq!(user.user_id, 20);
        assert_eq!(user.role, Role::Hr);
        assert_eq!(user.employee_id, Some(120));

        let req = TestRequest::post()
            .uri("/auth/refresh")
            .insert_header(("Authorization", format!("Bearer {}", tokens.refresh_token)))
            .to_request();
        let rotated: LoginResponse = call_and_read_body_json(&app, req).await;
        let old_jti = verify_token(&tokens.refresh_token, &config.jwt_secret).unwrap().jti;
        assert_eq!(store.token_revoked(&old_jti), Some(true));

        // the rotated-out token cannot be replayed
        let req = TestRequest::post()
            .uri("/auth/refresh")
            .insert_header(("Authorization", format!("Bearer {}", tokens.refresh_token)))
            .to_request();
        assert_eq!(call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        let req = TestRequest::post()
            .uri("/auth/logout")
            .insert_header(("Authorization", format!("Bearer {}", rotated.refresh_token)))
            .to_request();
        assert_eq!(call_service(&app, req).await.status(), StatusCode::NO_CONTENT);
        let new_jti = verify_token(&rotated.refresh_token, &config.jwt_secret).unwrap().jti;
        assert_eq!(store.token_revoked(&new_jti), Some(true));
    }

    #[actix_web::test]
    async fn login_rejects_bad_credentials() {
        let (_, data, config) = app_data();
        let app = init_service(
            App::new()
                .app_data(data)
                .app_data(config)
                .route("/auth/login", web::post().to(login)),
        )
        .await;

        for (username, password, status) in [
            ("rita", "wrong", StatusCode::UNAUTHORIZED),
            ("nobody", "pa55word", StatusCode::UNAUTHORIZED),
            ("", "pa55word", StatusCode::BAD_REQUEST),
        ] {
            let req = TestRequest::post()
                .uri("/auth/login")
                .set_json(serde_json::json!({"username": username, "password": password}))
                .to_request();
            assert_eq!(call_service(&app, req).await.status(), status);
        }
    }

    #[actix_web::test]
    async fn access_token_cannot_refresh() {
        let (_, data, config) = app_data();
        let app = init_service(
            App::new()
                .app_data(data)
                .app_data(config.clone())
                .route("/auth/refresh", web::post().to(refresh_token)),
        )
        .await;

        let access = generate_access_token(20, "rita".into(), Role::Hr.id(), None, &config.jwt_secret, 900).unwrap();
        let req = TestRequest::post()
            .uri("/auth/refresh")
            .insert_header(("Authorization", format!("Bearer {access}")))
            .to_request();
        assert_eq!(call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
    }
}
