// handlers/public/projects.rs - Read-only project catalog

use std::collections::HashMap;

use axum::extract::{Path, Query};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::{CommentView, PageParams, Pagination, ProjectView};
use crate::config::config;
use crate::database::{ProjectFilter, ProjectRepository, ProjectSort};
use crate::handlers::utils::parse_id;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::github_service::{Contributor, Readme};
use crate::services::GithubService;
use crate::validation::split_list;

const NOT_FOUND: &str = "Project not found";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub category: Option<String>,
    pub tags: Option<String>,
    pub search: Option<String>,
    pub featured: Option<String>,
    pub sort_by: Option<String>,
}

impl ProjectListQuery {
    pub fn page_params(&self) -> PageParams {
        let api = &config().api;
        PageParams::resolve(
            self.page.as_deref(),
            self.limit.as_deref(),
            api.default_page_size,
            api.max_page_size,
        )
    }

    pub fn filter(&self) -> ProjectFilter {
        ProjectFilter {
            category: self.category.clone(),
            tags: self
                .tags
                .as_deref()
                .and_then(|t| split_list(&Value::from(t)))
                .unwrap_or_default(),
            search: self.search.clone(),
            featured: self.featured.as_deref() == Some("true"),
            owner_id: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProjectList {
    pub projects: Vec<ProjectView>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
pub struct ProjectDetail {
    pub project: ProjectView,
    pub comments: Vec<CommentView>,
}

#[derive(Debug, Serialize)]
pub struct ReadmePayload {
    pub readme: Option<Readme>,
}

#[derive(Debug, Serialize)]
pub struct ContributorsPayload {
    pub contributors: Vec<Contributor>,
}

#[derive(Debug, Serialize)]
pub struct LanguagesPayload {
    /// Bytes of code per language, as GitHub reports them
    pub languages: HashMap<String, u64>,
}

/// Run a listing query and hydrate the page
pub async fn list_page(
    projects: &ProjectRepository,
    filter: &ProjectFilter,
    sort: ProjectSort,
    params: PageParams,
) -> ApiResult<ProjectList> {
    let (rows, total) = projects.list(filter, sort, params.limit, params.offset()).await?;
    let views = projects.views(rows).await?;

    Ok(ApiResponse::success(ProjectList {
        projects: views,
        pagination: Pagination::projects(params, total),
    }))
}

/// GET /api/projects - Filtered, sorted, paginated catalog
pub async fn list(Query(query): Query<ProjectListQuery>) -> ApiResult<ProjectList> {
    let projects = ProjectRepository::shared().await?;
    let sort = ProjectSort::parse(query.sort_by.as_deref());
    list_page(&projects, &query.filter(), sort, query.page_params()).await
}

/// GET /api/projects/:id - One project with its comments; counts a view
pub async fn get(Path(id): Path<String>) -> ApiResult<ProjectDetail> {
    let id = parse_id(&id, NOT_FOUND)?;
    let projects = ProjectRepository::shared().await?;

    let row = projects.record_view(id).await?;
    let comments = projects.comments(id).await?;
    let project = projects.view(row).await?;

    Ok(ApiResponse::success(ProjectDetail {
        project,
        comments: comments.into_iter().map(CommentView::from).collect(),
    }))
}

/// GET /api/projects/:id/readme - README from the linked repository
pub async fn readme(Path(id): Path<String>) -> ApiResult<ReadmePayload> {
    let id = parse_id(&id, NOT_FOUND)?;
    let project = ProjectRepository::shared().await?.get(id).await?;

    let readme = GithubService::shared()?.readme(&project.github_url).await;
    Ok(ApiResponse::success(ReadmePayload { readme }))
}

/// GET /api/projects/:id/contributors - Contributors of the linked repository
pub async fn contributors(Path(id): Path<String>) -> ApiResult<ContributorsPayload> {
    let id = parse_id(&id, NOT_FOUND)?;
    let project = ProjectRepository::shared().await?.get(id).await?;

    let contributors = GithubService::shared()?.contributors(&project.github_url).await;
    Ok(ApiResponse::success(ContributorsPayload { contributors }))
}

/// GET /api/projects/:id/languages - Language breakdown of the linked repository
pub async fn languages(Path(id): Path<String>) -> ApiResult<LanguagesPayload> {
    let id = parse_id(&id, NOT_FOUND)?;
    let project = ProjectRepository::shared().await?.get(id).await?;

    let languages = GithubService::shared()?.languages(&project.github_url).await;
    Ok(ApiResponse::success(LanguagesPayload { languages }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_maps_to_filter() {
        let query = ProjectListQuery {
            category: Some("AI/ML".into()),
            tags: Some("AI, Web".into()),
            search: Some("chat".into()),
            featured: Some("true".into()),
            ..Default::default()
        };
        let filter = query.filter();

        assert_eq!(filter.category.as_deref(), Some("AI/ML"));
        assert_eq!(filter.tags, vec!["AI".to_string(), "Web".into()]);
        assert!(filter.featured);
        assert!(filter.owner_id.is_none());
    }

    #[test]
    fn featured_needs_literal_true() {
        let query = ProjectListQuery {
            featured: Some("yes".into()),
            ..Default::default()
        };
        assert!(!query.filter().featured);
    }

    #[test]
    fn query_uses_camel_case_sort_key() {
        let query: ProjectListQuery = serde_json::from_value(serde_json::json!({ "sortBy": "stars" })).unwrap();
        assert_eq!(ProjectSort::parse(query.sort_by.as_deref()), ProjectSort::Stars);
    }
}
