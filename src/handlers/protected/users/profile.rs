use axum::Extension;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::{FormBody, PublicUser};
use crate::database::models::ProfileUpdate;
use crate::database::UserRepository;
use crate::handlers::public::users::ProfilePayload;
use crate::handlers::utils::{trimmed, user_with_ids, user_with_summaries};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::UploadStore;
use crate::validation::{
    is_github_profile_url, is_http_url, is_linkedin_url, split_list, Validator, BRANCHES, MAX_BIO_LENGTH,
    MAX_NAME_LENGTH, YEARS,
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub year: Option<String>,
    pub branch: Option<String>,
    pub github_profile: Option<String>,
    pub linkedin_profile: Option<String>,
    pub portfolio_url: Option<String>,
    pub skills: Option<Value>,
    pub avatar: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UpdatedUserPayload {
    pub user: PublicUser,
}

impl ProfileRequest {
    /// Trim every field. Empty strings are kept so optional links can be cleared.
    fn into_update(self) -> ProfileUpdate {
        ProfileUpdate {
            name: trimmed(self.name),
            bio: trimmed(self.bio),
            year: trimmed(self.year),
            branch: trimmed(self.branch),
            github_profile: trimmed(self.github_profile),
            linkedin_profile: trimmed(self.linkedin_profile),
            portfolio_url: trimmed(self.portfolio_url),
            skills: self.skills.as_ref().and_then(split_list),
            avatar: trimmed(self.avatar),
        }
    }
}

fn validate(update: &ProfileUpdate) -> Result<(), crate::error::ApiError> {
    let present_but_blank = |v: &Option<String>| v.as_deref().is_some_and(str::is_empty);

    Validator::new()
        .check(!present_but_blank(&update.name), "Name is required")
        .max_chars(update.name.as_deref(), MAX_NAME_LENGTH, "Name cannot exceed 50 characters")
        .max_chars(update.bio.as_deref(), MAX_BIO_LENGTH, "Bio cannot exceed 500 characters")
        .one_of(update.year.as_deref(), YEARS, "Please select a valid year")
        .one_of(update.branch.as_deref(), BRANCHES, "Please select a valid branch")
        .url(
            update.github_profile.as_deref(),
            is_github_profile_url,
            "Please enter a valid GitHub profile URL",
        )
        .url(
            update.linkedin_profile.as_deref(),
            is_linkedin_url,
            "Please enter a valid LinkedIn profile URL",
        )
        .url(update.portfolio_url.as_deref(), is_http_url, "Please enter a valid portfolio URL")
        .url(update.avatar.as_deref(), is_http_url, "Please enter a valid avatar URL")
        .finish()
}

/// GET /api/users/profile - The caller's profile with follower summaries
pub async fn profile_get(Extension(auth): Extension<AuthUser>) -> ApiResult<ProfilePayload> {
    let users = UserRepository::shared().await?;
    let user = users.get(auth.id).await?;

    Ok(ApiResponse::success(ProfilePayload {
        user: user_with_summaries(&users, user).await?,
    }))
}

/// PUT /api/users/profile - Partial profile update, optionally with an `avatar` image
pub async fn profile_put(
    Extension(auth): Extension<AuthUser>,
    mut form: FormBody<ProfileRequest>,
) -> ApiResult<UpdatedUserPayload> {
    let avatar_file = form.file("avatar")?;
    let mut update = form.data.into_update();
    validate(&update)?;

    if let Some(file) = avatar_file {
        update.avatar = Some(UploadStore::from_config().save(&file).await?);
    }

    let users = UserRepository::shared().await?;
    let user = users.update_profile(auth.id, update).await?;

    Ok(ApiResponse::success(UpdatedUserPayload {
        user: user_with_ids(&users, user).await?,
    })
    .with_message("Profile updated successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use serde_json::json;

    fn update(value: Value) -> ProfileUpdate {
        serde_json::from_value::<ProfileRequest>(value).unwrap().into_update()
    }

    #[test]
    fn empty_links_clear_but_blank_name_fails() {
        let u = update(json!({ "githubProfile": "  ", "skills": "rust, sql" }));
        assert_eq!(u.github_profile.as_deref(), Some(""));
        assert_eq!(u.skills, Some(vec!["rust".to_string(), "sql".into()]));
        assert!(validate(&u).is_ok());

        let u = update(json!({ "name": "   " }));
        assert!(matches!(validate(&u), Err(ApiError::ValidationError { .. })));
    }

    #[test]
    fn rejects_bad_profile_values() {
        let u = update(json!({
            "year": "Sixth Year",
            "linkedinProfile": "https://linkedin.com/ada",
            "avatar": "not-a-url"
        }));
        match validate(&u) {
            Err(ApiError::ValidationError { errors, .. }) => assert_eq!(errors.len(), 3),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn absent_fields_stay_untouched() {
        let u = update(json!({ "bio": "Hello" }));
        assert_eq!(u.bio.as_deref(), Some("Hello"));
        assert!(u.name.is_none());
        assert!(u.skills.is_none());
    }
}
