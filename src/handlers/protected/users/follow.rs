use axum::{extract::Path, Extension};
use tracing::debug;

use crate::database::UserRepository;
use crate::error::ApiError;
use crate::handlers::utils::parse_id;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

const NOT_FOUND: &str = "User not found";

/// POST /api/users/follow/:id - Follow another user
pub async fn follow(Extension(auth): Extension<AuthUser>, Path(id): Path<String>) -> ApiResult<()> {
    let target = parse_id(&id, NOT_FOUND)?;
    if target == auth.id {
        return Err(ApiError::bad_request("Cannot follow yourself"));
    }

    let users = UserRepository::shared().await?;
    users.get(target).await?;

    if !users.follow(auth.id, target).await? {
        return Err(ApiError::bad_request("Already following this user"));
    }

    debug!("User {} followed {}", auth.id, target);
    Ok(ApiResponse::message_only("User followed successfully"))
}

/// POST /api/users/unfollow/:id - Stop following a user
pub async fn unfollow(Extension(auth): Extension<AuthUser>, Path(id): Path<String>) -> ApiResult<()> {
    let target = parse_id(&id, NOT_FOUND)?;
    if target == auth.id {
        return Err(ApiError::bad_request("Cannot unfollow yourself"));
    }

    let users = UserRepository::shared().await?;
    users.get(target).await?;

    if !users.unfollow(auth.id, target).await? {
        return Err(ApiError::bad_request("Not following this user"));
    }

    debug!("User {} unfollowed {}", auth.id, target);
    Ok(ApiResponse::message_only("User unfollowed successfully"))
}
