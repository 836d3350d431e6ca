// handlers/public/auth/session.rs - POST /api/auth/login and POST /api/auth/refresh

use axum::{extract::rejection::JsonRejection, Json};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::auth::password::verify_password;
use crate::auth::validate_jwt;
use crate::database::UserRepository;
use crate::error::ApiError;
use crate::handlers::utils::{clean, issue_token, user_with_ids, AuthPayload};
use crate::middleware::{ApiResponse, ApiResult};
use crate::validation::normalize_email;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenPayload {
    pub token: String,
}

/// POST /api/auth/login - Exchange email and password for a session token
pub async fn login_post(payload: Result<Json<LoginRequest>, JsonRejection>) -> ApiResult<AuthPayload> {
    let Json(request) = payload?;

    let (Some(email), Some(password)) = (clean(request.email), request.password.filter(|p| !p.is_empty())) else {
        return Err(ApiError::bad_request("Email and password are required"));
    };

    let users = UserRepository::shared().await?;
    let user = users
        .find_by_email(&normalize_email(&email))
        .await?
        .ok_or_else(|| ApiError::unauthorized(INVALID_CREDENTIALS))?;

    // GitHub-only accounts have no password to check against
    let Some(hash) = user.password_hash.as_deref() else {
        debug!("Password login attempted for GitHub-only user {}", user.id);
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    };

    if !verify_password(&password, hash).await? {
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    }

    info!("User {} logged in", user.id);
    let token = issue_token(&user)?;
    let user = user_with_ids(&users, user).await?;

    Ok(ApiResponse::success(AuthPayload { user, token }).with_message("Login successful"))
}

/// POST /api/auth/refresh - Trade an unexpired token for a fresh one
pub async fn refresh_post(payload: Result<Json<RefreshRequest>, JsonRejection>) -> ApiResult<TokenPayload> {
    let Json(request) = payload?;
    let token = clean(request.token).ok_or_else(|| ApiError::bad_request("Token is required"))?;

    let claims = validate_jwt(&token)?;

    let user = UserRepository::shared()
        .await?
        .find_by_id(claims.sub)
        .await?
        .ok_or_else(|| ApiError::unauthorized("User not found"))?;

    Ok(ApiResponse::success(TokenPayload {
        token: issue_token(&user)?,
    }))
}
