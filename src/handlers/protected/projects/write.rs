use axum::{extract::Path, Extension};
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use super::{ProjectPayload, NOT_FOUND};
use crate::api::FormBody;
use crate::config::config;
use crate::database::models::project::STATUSES;
use crate::database::models::{GithubData, NewProject, ProjectUpdate};
use crate::database::{DatabaseError, ProjectRepository};
use crate::error::ApiError;
use crate::handlers::utils::{clean, parse_id, trimmed};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::{GithubService, UploadStore};
use crate::validation::{
    is_github_repo_url, is_http_url, split_list, Validator, CATEGORIES, MAX_DESCRIPTION_LENGTH,
    MAX_LONG_DESCRIPTION_LENGTH, MAX_OWNER_NAME_LENGTH, MAX_TITLE_LENGTH, TAGS,
};

const INACCESSIBLE_REPO: &str = "Invalid or inaccessible GitHub repository URL";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub long_description: Option<String>,
    pub technologies: Option<Value>,
    pub tags: Option<Value>,
    pub category: Option<String>,
    pub github_url: Option<String>,
    pub live_url: Option<String>,
    pub owner_name: Option<String>,
    pub logo_url: Option<String>,
    pub logo: Option<String>,
    pub images: Option<Value>,
    pub status: Option<String>,
}

/// Trimmed request fields, shared by create and update
#[derive(Debug, Default)]
struct ProjectFields {
    title: Option<String>,
    description: Option<String>,
    long_description: Option<String>,
    technologies: Option<Vec<String>>,
    tags: Option<Vec<String>>,
    category: Option<String>,
    github_url: Option<String>,
    live_url: Option<String>,
    owner_name: Option<String>,
    logo: Option<String>,
    images: Vec<String>,
    status: Option<String>,
}

impl ProjectFields {
    /// Blank optional fields count as absent
    fn for_create(request: ProjectRequest) -> Self {
        Self::collect(request, clean)
    }

    /// Blank optional fields stay `Some("")` so the update clears them
    fn for_update(request: ProjectRequest) -> Self {
        Self::collect(request, trimmed)
    }

    fn collect(request: ProjectRequest, optional: fn(Option<String>) -> Option<String>) -> Self {
        Self {
            title: clean(request.title),
            description: clean(request.description),
            long_description: optional(request.long_description),
            technologies: request.technologies.as_ref().and_then(split_list),
            tags: request.tags.as_ref().and_then(split_list),
            category: clean(request.category),
            github_url: clean(request.github_url),
            live_url: optional(request.live_url),
            owner_name: clean(request.owner_name),
            logo: optional(request.logo_url).or_else(|| optional(request.logo)),
            images: request.images.as_ref().and_then(split_list).unwrap_or_default(),
            status: clean(request.status),
        }
    }

    /// Rules that apply to any field that is present
    fn check_present(&self, v: &mut Validator) {
        v.max_chars(self.title.as_deref(), MAX_TITLE_LENGTH, "Title cannot exceed 100 characters")
            .max_chars(
                self.description.as_deref(),
                MAX_DESCRIPTION_LENGTH,
                "Description cannot exceed 500 characters",
            )
            .max_chars(
                self.long_description.as_deref(),
                MAX_LONG_DESCRIPTION_LENGTH,
                "Long description cannot exceed 2000 characters",
            )
            .max_chars(
                self.owner_name.as_deref(),
                MAX_OWNER_NAME_LENGTH,
                "Owner name cannot exceed 50 characters",
            )
            .one_of(self.category.as_deref(), CATEGORIES, "Please select a valid category")
            .each_one_of(self.tags.as_deref(), TAGS, "tag")
            .url(self.live_url.as_deref(), is_http_url, "Please enter a valid live URL")
            .one_of(self.status.as_deref(), STATUSES, "Please select a valid status");
    }
}

/// Map a duplicate repository URL to the 400 the frontend expects
fn duplicate_url_as_bad_request(err: DatabaseError) -> ApiError {
    match err {
        DatabaseError::Conflict(message) => ApiError::bad_request(message),
        other => other.into(),
    }
}

/// POST /api/projects - Submit a project linked to a GitHub repository.
/// A `logo` file part, when sent, replaces any `logo`/`logoUrl` text field.
pub async fn create(
    Extension(auth): Extension<AuthUser>,
    mut form: FormBody<ProjectRequest>,
) -> ApiResult<ProjectPayload> {
    let logo_file = form.file("logo")?;
    let mut fields = ProjectFields::for_create(form.data);

    let mut v = Validator::new();
    v.required(fields.title.as_deref(), "Project title is required")
        .required(fields.description.as_deref(), "Project description is required")
        .required(fields.category.as_deref(), "Project category is required")
        .required(fields.github_url.as_deref(), "GitHub URL is required");
    fields.check_present(&mut v);
    v.finish()?;

    let github_url = fields.github_url.unwrap_or_default();
    let github = GithubService::shared()?;
    if !is_github_repo_url(&github_url) || !github.validate_repo_url(&github_url).await {
        return Err(ApiError::bad_request(INACCESSIBLE_REPO));
    }

    let github_data = match github.repo_info(&github_url).await {
        Ok(data) => data,
        Err(e) => {
            warn!("Using placeholder GitHub data for {}: {}", github_url, e);
            GithubData::unavailable()
        }
    };

    if let Some(file) = logo_file {
        fields.logo = Some(UploadStore::from_config().save(&file).await?);
    }

    let projects = ProjectRepository::shared().await?;
    let row = projects
        .create(NewProject {
            title: fields.title.unwrap_or_default(),
            description: fields.description.unwrap_or_default(),
            long_description: fields.long_description,
            owner_id: auth.id,
            owner_name: fields.owner_name.unwrap_or_else(|| auth.name.clone()),
            technologies: fields.technologies.unwrap_or_default(),
            tags: fields.tags.unwrap_or_default(),
            category: fields.category.unwrap_or_default(),
            github_url,
            live_url: fields.live_url,
            logo: fields.logo.unwrap_or_default(),
            github_data,
        })
        .await
        .map_err(duplicate_url_as_bad_request)?;

    info!("User {} created project {}", auth.id, row.project.id);
    let project = projects.view(row).await?;

    Ok(ApiResponse::created(ProjectPayload { project }).with_message("Project created successfully"))
}

/// PUT /api/projects/:id - Partial update by the owner or an admin.
/// Up to five `images` file parts are appended after any `images` URLs.
pub async fn update(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    mut form: FormBody<ProjectRequest>,
) -> ApiResult<ProjectPayload> {
    let id = parse_id(&id, NOT_FOUND)?;
    let image_files = form.files("images", config().uploads.max_project_images)?;
    let request = form.data;
    let blank_title = request.title.as_deref().is_some_and(|t| t.trim().is_empty());
    let blank_description = request.description.as_deref().is_some_and(|d| d.trim().is_empty());
    let mut fields = ProjectFields::for_update(request);

    let projects = ProjectRepository::shared().await?;
    let existing = projects.get(id).await?;
    if !existing.can_modify(auth.id, auth.is_admin()) {
        return Err(ApiError::forbidden("Not authorized to update this project"));
    }

    let mut v = Validator::new();
    v.check(!blank_title, "Project title is required")
        .check(!blank_description, "Project description is required")
        .url(
            fields.github_url.as_deref(),
            is_github_repo_url,
            "Please enter a valid GitHub repository URL",
        );
    fields.check_present(&mut v);
    v.finish()?;

    if !image_files.is_empty() {
        let stored = UploadStore::from_config().save_all(&image_files).await?;
        fields.images.extend(stored);
    }

    let row = projects
        .update(
            id,
            ProjectUpdate {
                title: fields.title,
                description: fields.description,
                long_description: fields.long_description,
                technologies: fields.technologies,
                tags: fields.tags,
                category: fields.category,
                github_url: fields.github_url,
                live_url: fields.live_url,
                logo: fields.logo,
                status: fields.status,
                new_images: fields.images,
            },
        )
        .await
        .map_err(duplicate_url_as_bad_request)?;

    let project = projects.view(row).await?;
    Ok(ApiResponse::success(ProjectPayload { project }).with_message("Project updated successfully"))
}

/// DELETE /api/projects/:id - Remove a project and its likes and comments
pub async fn delete(Extension(auth): Extension<AuthUser>, Path(id): Path<String>) -> ApiResult<()> {
    let id = parse_id(&id, NOT_FOUND)?;
    let projects = ProjectRepository::shared().await?;

    let existing = projects.get(id).await?;
    if !existing.can_modify(auth.id, auth.is_admin()) {
        return Err(ApiError::forbidden("Not authorized to delete this project"));
    }

    projects.delete(id).await?;
    info!("User {} deleted project {}", auth.id, id);
    Ok(ApiResponse::message_only("Project deleted successfully"))
}
