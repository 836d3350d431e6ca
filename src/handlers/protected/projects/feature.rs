use axum::{
    extract::{rejection::JsonRejection, Path},
    Extension, Json,
};
use serde::Deserialize;
use tracing::info;

use super::{ProjectPayload, NOT_FOUND};
use crate::database::ProjectRepository;
use crate::error::ApiError;
use crate::handlers::utils::parse_id;
use crate::middleware::{require_admin, ApiResponse, ApiResult, AuthUser};

#[derive(Debug, Deserialize)]
pub struct FeatureRequest {
    #[serde(default = "featured_by_default")]
    pub featured: bool,
}

fn featured_by_default() -> bool {
    true
}

/// PUT /api/projects/:id/featured - Admin curation of the featured list
pub async fn set_featured(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Result<Json<FeatureRequest>, JsonRejection>,
) -> ApiResult<ProjectPayload> {
    require_admin(&auth)?;
    let id = parse_id(&id, NOT_FOUND)?;
    let Json(request) = payload?;

    let projects = ProjectRepository::shared().await?;
    if projects.set_featured(id, request.featured).await?.is_none() {
        return Err(ApiError::not_found(NOT_FOUND));
    }

    info!("Admin {} set featured={} on project {}", auth.id, request.featured, id);
    let row = projects.find_row(id).await?.ok_or_else(|| ApiError::not_found(NOT_FOUND))?;
    let project = projects.view(row).await?;

    let message = if request.featured { "Project featured" } else { "Project unfeatured" };
    Ok(ApiResponse::success(ProjectPayload { project }).with_message(message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_means_feature() {
        let request: FeatureRequest = serde_json::from_str("{}").unwrap();
        assert!(request.featured);

        let request: FeatureRequest = serde_json::from_str(r#"{"featured":false}"#).unwrap();
        assert!(!request.featured);
    }
}
