use axum::{extract::Path, Extension};
use serde::Serialize;
use tracing::warn;

use super::NOT_FOUND;
use crate::database::models::GithubData;
use crate::database::ProjectRepository;
use crate::error::ApiError;
use crate::handlers::utils::parse_id;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::GithubService;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GithubDataPayload {
    pub github_data: GithubData,
}

/// POST /api/projects/:id/refresh-github - Re-fetch and store repository stats
pub async fn refresh_github(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<GithubDataPayload> {
    let id = parse_id(&id, NOT_FOUND)?;
    let projects = ProjectRepository::shared().await?;

    let project = projects.get(id).await?;
    if !project.can_modify(auth.id, auth.is_admin()) {
        return Err(ApiError::forbidden("Not authorized to refresh GitHub data for this project"));
    }

    let github_data = match GithubService::shared()?.repo_info(&project.github_url).await {
        Ok(data) => data,
        Err(e) => {
            warn!("GitHub refresh failed for project {}: {}", id, e);
            return Err(ApiError::bad_request(
                "Failed to fetch GitHub data. Please check if the repository is accessible.",
            ));
        }
    };

    projects.set_github_data(id, &github_data).await?;
    Ok(ApiResponse::success(GithubDataPayload { github_data }).with_message("GitHub data refreshed successfully"))
}
