use axum::{extract::Query, Extension};

use crate::database::{ProjectFilter, ProjectRepository, ProjectSort};
use crate::handlers::public::projects::{list_page, ProjectList, ProjectListQuery};
use crate::middleware::{ApiResult, AuthUser};

/// GET /api/projects/my-projects - The caller's own projects, newest first
pub async fn my_projects(
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<ProjectListQuery>,
) -> ApiResult<ProjectList> {
    let filter = ProjectFilter {
        owner_id: Some(auth.id),
        ..Default::default()
    };
    let projects = ProjectRepository::shared().await?;
    list_page(&projects, &filter, ProjectSort::CreatedAt, query.page_params()).await
}
