// handlers/public/auth/github.rs - GitHub OAuth login flow
//
// The OAuth `state` is a short-lived signed JWT, so no server session is kept
// between the redirect to GitHub and the callback.

use axum::{extract::Query, response::Redirect};
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::auth::{generate_oauth_state, validate_oauth_state};
use crate::config::config;
use crate::database::models::User;
use crate::database::UserRepository;
use crate::error::ApiError;
use crate::handlers::utils::issue_token;
use crate::services::{link_github_account, GithubService};

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Why the callback could not produce a user
#[derive(Debug, PartialEq, Eq)]
enum CallbackFailure {
    /// GitHub or the database failed mid-flow
    Error,
    /// The user denied access or the state did not verify
    Failed,
}

/// GET /api/auth/github - Redirect to GitHub's authorize page
pub async fn github_login() -> Result<Redirect, ApiError> {
    let github = GithubService::shared()?;
    if !github.oauth_enabled() {
        return Err(ApiError::not_implemented("GitHub OAuth not configured"));
    }

    let state = generate_oauth_state()?;
    let url = github.authorize_url(&state)?;
    Ok(Redirect::to(&url))
}

/// GET /api/auth/github/callback - Finish the flow and hand a token to the frontend
pub async fn github_callback(Query(query): Query<CallbackQuery>) -> Redirect {
    let frontend = config().server.frontend_url.trim_end_matches('/');

    let user = match authenticate(query).await {
        Ok(user) => user,
        Err(CallbackFailure::Failed) => return Redirect::to(&login_error(frontend, "oauth_failed")),
        Err(CallbackFailure::Error) => return Redirect::to(&login_error(frontend, "oauth_error")),
    };

    match issue_token(&user) {
        Ok(token) => {
            info!("GitHub login for user {}", user.id);
            Redirect::to(&format!("{}/auth/callback?token={}", frontend, token))
        }
        Err(e) => {
            error!("Token generation failed after GitHub login: {}", e);
            Redirect::to(&login_error(frontend, "token_error"))
        }
    }
}

async fn authenticate(query: CallbackQuery) -> Result<User, CallbackFailure> {
    if let Some(reason) = query.error {
        info!("GitHub authorization declined: {}", reason);
        return Err(CallbackFailure::Failed);
    }

    let (Some(code), Some(state)) = (query.code, query.state) else {
        return Err(CallbackFailure::Failed);
    };

    if let Err(e) = validate_oauth_state(&state) {
        warn!("Rejected GitHub OAuth state: {}", e);
        return Err(CallbackFailure::Failed);
    }

    let github = GithubService::shared().map_err(|e| {
        error!("GitHub client unavailable: {}", e);
        CallbackFailure::Error
    })?;

    let access_token = github.exchange_code(&code).await.map_err(|e| {
        error!("GitHub code exchange failed: {}", e);
        CallbackFailure::Error
    })?;

    let profile = github.fetch_profile(&access_token).await.map_err(|e| {
        error!("GitHub profile fetch failed: {}", e);
        CallbackFailure::Error
    })?;

    let users = UserRepository::shared().await.map_err(|e| {
        error!("Database unavailable during GitHub login: {}", e);
        CallbackFailure::Error
    })?;

    link_github_account(&users, &profile).await.map_err(|e| {
        error!("Linking GitHub account {} failed: {}", profile.login, e);
        CallbackFailure::Error
    })
}

fn login_error(frontend: &str, code: &str) -> String {
    format!("{}/login?error={}", frontend, code)
}
