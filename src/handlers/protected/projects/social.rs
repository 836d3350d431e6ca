use axum::{
    extract::{rejection::JsonRejection, Path},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use super::NOT_FOUND;
use crate::api::CommentView;
use crate::database::ProjectRepository;
use crate::error::ApiError;
use crate::handlers::utils::parse_id;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::validation::{Validator, MAX_COMMENT_LENGTH};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikePayload {
    pub liked: bool,
    pub likes_count: i64,
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CommentPayload {
    pub comment: CommentView,
}

/// POST /api/projects/:id/like - Like or unlike
pub async fn toggle_like(Extension(auth): Extension<AuthUser>, Path(id): Path<String>) -> ApiResult<LikePayload> {
    let id = parse_id(&id, NOT_FOUND)?;
    let projects = ProjectRepository::shared().await?;
    projects.get(id).await?;

    let (liked, likes_count) = projects.toggle_like(id, auth.id).await?;
    let message = if liked { "Project liked" } else { "Project unliked" };

    Ok(ApiResponse::success(LikePayload { liked, likes_count }).with_message(message))
}

/// POST /api/projects/:id/comments - Add a comment
pub async fn add_comment(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Result<Json<CommentRequest>, JsonRejection>,
) -> ApiResult<CommentPayload> {
    let id = parse_id(&id, NOT_FOUND)?;
    let Json(request) = payload?;

    let text = request.text.as_deref().map(str::trim).unwrap_or_default();
    if text.is_empty() {
        return Err(ApiError::bad_request("Comment text is required"));
    }
    Validator::new()
        .max_chars(Some(text), MAX_COMMENT_LENGTH, "Comment cannot exceed 500 characters")
        .finish()?;

    let projects = ProjectRepository::shared().await?;
    projects.get(id).await?;

    let row = projects.add_comment(id, auth.id, text).await?;
    Ok(ApiResponse::created(CommentPayload {
        comment: CommentView::from(row),
    })
    .with_message("Comment added successfully"))
}
