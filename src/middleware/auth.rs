use axum::{
    extract::Request,
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::{validate_jwt, ROLE_ADMIN};
use crate::database::models::User;
use crate::database::UserRepository;
use crate::error::ApiError;

pub const NO_TOKEN_MESSAGE: &str = "Access denied. No token provided or invalid format.";

/// Authenticated caller, loaded fresh from the users table on every request
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

impl From<&User> for AuthUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role.clone(),
        }
    }
}

/// JWT authentication middleware: validates the bearer token, then loads the
/// user it names and injects an `AuthUser` into the request extensions.
pub async fn jwt_auth_middleware(headers: HeaderMap, mut request: Request, next: Next) -> Result<Response, ApiError> {
    let token = extract_bearer(&headers).ok_or_else(|| ApiError::unauthorized(NO_TOKEN_MESSAGE))?;
    let claims = validate_jwt(token)?;

    let user = UserRepository::shared()
        .await?
        .find_by_id(claims.sub)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Token is valid but user not found"))?;

    request.extensions_mut().insert(AuthUser::from(&user));
    Ok(next.run(request).await)
}

pub fn require_admin(user: &AuthUser) -> Result<(), ApiError> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(ApiError::forbidden("Admin access required"))
    }
}

/// Bearer token from the Authorization header, if well formed
fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn bearer_extraction() {
        assert_eq!(extract_bearer(&headers("Bearer abc.def")), Some("abc.def"));
        assert_eq!(extract_bearer(&headers("Bearer   ")), None);
        assert_eq!(extract_bearer(&headers("Basic abc")), None);
        assert_eq!(extract_bearer(&HeaderMap::new()), None);
    }

    #[test]
    fn admin_gate() {
        let mut user = AuthUser {
            id: Uuid::new_v4(),
            email: "ada@example.com".into(),
            name: "Ada".into(),
            role: "student".into(),
        };
        let err = require_admin(&user).unwrap_err();
        assert_eq!(err.status_code(), 403);
        assert_eq!(err.message(), "Admin access required");

        user.role = ROLE_ADMIN.into();
        assert!(require_admin(&user).is_ok());
    }
}
