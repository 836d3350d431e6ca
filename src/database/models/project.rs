use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use uuid::Uuid;

pub const STATUS_ACTIVE: &str = "active";
pub const STATUSES: &[&str] = &["active", "completed", "archived"];

/// Repository metadata cached from the GitHub API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GithubData {
    #[serde(default)]
    pub stars: i64,
    #[serde(default)]
    pub forks: i64,
    #[serde(default)]
    pub language: String,
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub contributors: i64,
    #[serde(default)]
    pub watchers: i64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub default_branch: Option<String>,
    #[serde(default)]
    pub size: i64,
    #[serde(default)]
    pub open_issues: i64,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub homepage: Option<String>,
}

impl GithubData {
    /// What a project gets when GitHub cannot be reached at creation time
    pub fn unavailable() -> Self {
        Self {
            stars: 0,
            forks: 0,
            language: "Unknown".to_string(),
            last_updated: Some(Utc::now()),
            contributors: 0,
            watchers: 0,
            description: None,
            topics: Vec::new(),
            default_branch: None,
            size: 0,
            open_issues: 0,
            license: None,
            homepage: None,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub long_description: Option<String>,
    pub owner_id: Option<Uuid>,
    pub owner_name: String,
    pub technologies: Vec<String>,
    pub tags: Vec<String>,
    pub category: String,
    pub github_url: String,
    pub live_url: Option<String>,
    pub logo: String,
    pub images: Vec<String>,
    pub github_data: Option<Json<GithubData>>,
    pub status: String,
    pub featured: bool,
    pub views: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Owners and admins may modify a project. Projects whose owner account
    /// was deleted can only be modified by admins.
    pub fn can_modify(&self, user_id: Uuid, is_admin: bool) -> bool {
        is_admin || self.owner_id == Some(user_id)
    }
}

/// A project row plus the aggregates every listing needs
#[derive(Debug, Clone, FromRow)]
pub struct ProjectRow {
    #[sqlx(flatten)]
    pub project: Project,
    pub like_ids: Vec<Uuid>,
    pub likes_count: i64,
    pub comments_count: i64,
}

#[derive(Debug, Clone)]
pub struct NewProject {
    pub title: String,
    pub description: String,
    pub long_description: Option<String>,
    pub owner_id: Uuid,
    pub owner_name: String,
    pub technologies: Vec<String>,
    pub tags: Vec<String>,
    pub category: String,
    pub github_url: String,
    pub live_url: Option<String>,
    pub logo: String,
    pub github_data: GithubData,
}

/// Partial project update; `None` leaves the column untouched
#[derive(Debug, Clone, Default)]
pub struct ProjectUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub long_description: Option<String>,
    pub technologies: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub category: Option<String>,
    pub github_url: Option<String>,
    pub live_url: Option<String>,
    pub logo: Option<String>,
    pub status: Option<String>,
    /// Appended to the existing image list
    pub new_images: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(owner_id: Option<Uuid>) -> Project {
        Project {
            id: Uuid::new_v4(),
            title: "Collab".into(),
            description: "A showcase".into(),
            long_description: None,
            owner_id,
            owner_name: "Ada".into(),
            technologies: vec![],
            tags: vec![],
            category: "Other".into(),
            github_url: "https://github.com/ada/collab".into(),
            live_url: None,
            logo: String::new(),
            images: vec![],
            github_data: None,
            status: STATUS_ACTIVE.into(),
            featured: false,
            views: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn owner_and_admin_can_modify() {
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let p = project(Some(owner));

        assert!(p.can_modify(owner, false));
        assert!(!p.can_modify(stranger, false));
        assert!(p.can_modify(stranger, true));
    }

    #[test]
    fn orphaned_project_is_admin_only() {
        let p = project(None);
        assert!(!p.can_modify(Uuid::new_v4(), false));
        assert!(p.can_modify(Uuid::new_v4(), true));
    }

    #[test]
    fn github_data_tolerates_missing_fields() {
        let data: GithubData = serde_json::from_value(serde_json::json!({ "stars": 3 })).unwrap();
        assert_eq!(data.stars, 3);
        assert_eq!(data.forks, 0);
        assert!(data.last_updated.is_none());
    }
}
