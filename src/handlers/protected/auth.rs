// handlers/protected/auth.rs - GET /api/auth/me handler

use axum::Extension;
use serde::Serialize;

use crate::api::PublicUser;
use crate::database::UserRepository;
use crate::handlers::utils::user_with_ids;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

#[derive(Debug, Serialize)]
pub struct MePayload {
    pub user: PublicUser,
}

/// GET /api/auth/me - The authenticated caller
pub async fn me(Extension(auth): Extension<AuthUser>) -> ApiResult<MePayload> {
    let users = UserRepository::shared().await?;
    let user = users.get(auth.id).await?;

    Ok(ApiResponse::success(MePayload {
        user: user_with_ids(&users, user).await?,
    }))
}
