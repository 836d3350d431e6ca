// handlers/public/auth/register.rs - POST /api/auth/register handler

use axum::{extract::rejection::JsonRejection, Json};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::api::PublicUser;
use crate::auth::password::{hash_password, MIN_PASSWORD_LENGTH};
use crate::config::config;
use crate::database::models::user::AUTH_PROVIDER_LOCAL;
use crate::database::models::NewUser;
use crate::database::UserRepository;
use crate::error::ApiError;
use crate::handlers::utils::{clean, issue_token, AuthPayload};
use crate::middleware::{ApiResponse, ApiResult};
use crate::validation::{
    is_valid_email, normalize_email, split_list, Validator, BRANCHES, MAX_BIO_LENGTH, MAX_NAME_LENGTH, YEARS,
};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub year: Option<String>,
    pub branch: Option<String>,
    pub bio: Option<String>,
    /// Array of strings or a comma-separated string
    pub skills: Option<Value>,
}

/// POST /api/auth/register - Create a local account and return a session token
pub async fn register_post(payload: Result<Json<RegisterRequest>, JsonRejection>) -> ApiResult<AuthPayload> {
    let Json(request) = payload?;

    let name = clean(request.name);
    let email = clean(request.email).map(|e| normalize_email(&e));
    let year = clean(request.year);
    let branch = clean(request.branch);
    let bio = clean(request.bio);
    let password = request.password.unwrap_or_default();

    Validator::new()
        .required(name.as_deref(), "Name is required")
        .max_chars(name.as_deref(), MAX_NAME_LENGTH, "Name cannot exceed 50 characters")
        .required(email.as_deref(), "Email is required")
        .check(email.as_deref().map_or(true, is_valid_email), "Please enter a valid email")
        .check(
            password.chars().count() >= MIN_PASSWORD_LENGTH,
            "Password must be at least 6 characters",
        )
        .required(year.as_deref(), "Year is required")
        .one_of(year.as_deref(), YEARS, "Please select a valid year")
        .required(branch.as_deref(), "Branch is required")
        .one_of(branch.as_deref(), BRANCHES, "Please select a valid branch")
        .max_chars(bio.as_deref(), MAX_BIO_LENGTH, "Bio cannot exceed 500 characters")
        .finish()?;

    let email = email.unwrap_or_default();
    let users = UserRepository::shared().await?;
    if users.find_by_email(&email).await?.is_some() {
        return Err(ApiError::conflict("User with this email already exists"));
    }

    let password_hash = hash_password(&password, config().security.bcrypt_cost).await?;

    let user = users
        .create(NewUser {
            name: name.unwrap_or_default(),
            email,
            password_hash: Some(password_hash),
            avatar: String::new(),
            bio,
            year: year.unwrap_or_default(),
            branch: branch.unwrap_or_default(),
            skills: request.skills.as_ref().and_then(split_list).unwrap_or_default(),
            github_id: None,
            github_username: None,
            auth_provider: AUTH_PROVIDER_LOCAL.to_string(),
        })
        .await?;

    info!("Registered user {}", user.id);
    let token = issue_token(&user)?;

    Ok(ApiResponse::created(AuthPayload {
        user: PublicUser::new(user, Vec::new(), Vec::new()),
        token,
    })
    .with_message("User registered successfully"))
}
