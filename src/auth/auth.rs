use crate::config::Config;
use crate::error::AppError;
use crate::model::role::{Permission, Role};
use crate::models::TokenType;
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, error::ErrorUnauthorized, web::Data};
use futures::future::{Ready, ready};

use super::jwt::verify_token;

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: u64,
    pub username: String,
    pub role: Role,

    /// Present only if this user is linked to an employee record
    pub employee_id: Option<u64>,
}

/// Reason a bearer token was not accepted.
#[derive(Debug, PartialEq)]
pub enum TokenRejection {
    Missing,
    Malformed,
    Invalid(String),
    WrongType,
    UnknownRole,
}

impl TokenRejection {
    pub fn message(&self) -> String {
        match self {
            TokenRejection::Missing => "Missing Authorization header".to_string(),
            TokenRejection::Malformed => "Authorization header must start with Bearer".to_string(),
            TokenRejection::Invalid(e) => format!("Invalid or expired token: {e}"),
            TokenRejection::WrongType => "Access token required".to_string(),
            TokenRejection::UnknownRole => "Invalid role".to_string(),
        }
    }
}

/// Extracts the bearer token from an `Authorization` header value.
pub fn bearer_token(header: Option<&str>) -> Result<&str, TokenRejection> {
    header
        .ok_or(TokenRejection::Missing)?
        .strip_prefix("Bearer ")
        .ok_or(TokenRejection::Malformed)
}

/// Verifies an access token and builds the acting user from its claims.
pub fn authenticate(token: &str, secret: &str) -> Result<AuthUser, TokenRejection> {
    let claims = verify_token(token, secret).map_err(TokenRejection::Invalid)?;

    if claims.token_type != TokenType::Access {
        return Err(TokenRejection::WrongType);
    }

    let role = Role::from_id(claims.role).ok_or(TokenRejection::UnknownRole)?;

    Ok(AuthUser {
        user_id: claims.user_id,
        username: claims.sub,
        role,
        employee_id: claims.employee_id,
    })
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        // Set by auth_middleware on protected routes.
        if let Some(user) = req.extensions().get::<AuthUser>() {
            return ready(Ok(user.clone()));
        }

        let config = match req.app_data::<Data<Config>>() {
            Some(c) => c,
            None => {
                return ready(Err(actix_web::error::ErrorInternalServerError(
                    "Config missing",
                )));
            }
        };

        let header = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok());

        let result = bearer_token(header)
            .and_then(|token| authenticate(token, &config.jwt_secret))
            .map_err(|rejection| ErrorUnauthorized(rejection.message()));

        ready(result)
    }
}

impl AuthUser {
    pub fn can(&self, permission: Permission) -> bool {
        self.role.can(permission)
    }

    pub fn require(&self, permission: Permission) -> Result<(), AppError> {
        if self.can(permission) {
            Ok(())
        } else {
            Err(AppError::Authorization(format!(
                "Role '{}' may not {}",
                self.role,
                permission.as_ref().replace('_', " ")
            )))
        }
    }
}
