//! Public wire format for users, projects and comments.
//!
//! Field names follow the JSON the frontend already consumes: camelCase keys
//! and the record id under `_id`. Password hashes never leave this layer.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

pub use crate::database::models::UserSummary;
use crate::database::models::{CommentRow, GithubData, ProjectRow, User};

/// A user as returned by the API. `F` is either a bare id (listings) or a
/// `UserSummary` (profile pages).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser<F: Serialize = Uuid> {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar: String,
    pub bio: Option<String>,
    pub year: String,
    pub branch: String,
    pub github_profile: Option<String>,
    pub github_username: Option<String>,
    pub linkedin_profile: Option<String>,
    pub portfolio_url: Option<String>,
    pub skills: Vec<String>,
    pub followers: Vec<F>,
    pub following: Vec<F>,
    pub is_verified: bool,
    pub role: String,
    pub auth_provider: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<F: Serialize> PublicUser<F> {
    pub fn new(user: User, followers: Vec<F>, following: Vec<F>) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            avatar: user.avatar,
            bio: user.bio,
            year: user.year,
            branch: user.branch,
            github_profile: user.github_profile,
            github_username: user.github_username,
            linkedin_profile: user.linkedin_profile,
            portfolio_url: user.portfolio_url,
            skills: user.skills,
            followers,
            following,
            is_verified: user.is_verified,
            role: user.role,
            auth_provider: user.auth_provider,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectView {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub long_description: Option<String>,
    pub owner: Option<UserSummary>,
    pub owner_name: String,
    pub collaborators: Vec<UserSummary>,
    pub technologies: Vec<String>,
    pub tags: Vec<String>,
    pub category: String,
    pub github_url: String,
    pub live_url: Option<String>,
    pub logo: String,
    pub images: Vec<String>,
    pub likes: Vec<Uuid>,
    pub likes_count: i64,
    pub comments_count: i64,
    pub github_data: Option<GithubData>,
    pub status: String,
    pub featured: bool,
    pub views: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProjectView {
    pub fn new(row: ProjectRow, owner: Option<UserSummary>, collaborators: Vec<UserSummary>) -> Self {
        let ProjectRow {
            project,
            like_ids,
            likes_count,
            comments_count,
        } = row;

        Self {
            id: project.id,
            title: project.title,
            description: project.description,
            long_description: project.long_description,
            owner,
            owner_name: project.owner_name,
            collaborators,
            technologies: project.technologies,
            tags: project.tags,
            category: project.category,
            github_url: project.github_url,
            live_url: project.live_url,
            logo: project.logo,
            images: project.images,
            likes: like_ids,
            likes_count,
            comments_count,
            github_data: project.github_data.map(|json| json.0),
            status: project.status,
            featured: project.featured,
            views: project.views,
            created_at: project.created_at,
            updated_at: project.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentAuthor {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub avatar: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub user: CommentAuthor,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl From<CommentRow> for CommentView {
    fn from(row: CommentRow) -> Self {
        Self {
            id: row.id,
            user: CommentAuthor {
                id: row.user_id,
                name: row.user_name,
                avatar: row.user_avatar,
            },
            text: row.text,
            created_at: row.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::Project;

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password_hash: Some("$2b$12$hash".into()),
            avatar: String::new(),
            bio: None,
            year: "Final Year".into(),
            branch: "Computer Science".into(),
            github_profile: None,
            github_id: None,
            github_username: None,
            linkedin_profile: None,
            portfolio_url: None,
            skills: vec!["rust".into()],
            is_verified: false,
            role: "student".into(),
            auth_provider: "local".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn public_user_uses_wire_names_and_hides_password() {
        let u = user();
        let id = u.id;
        let value = serde_json::to_value(PublicUser::<Uuid>::new(u, vec![], vec![])).unwrap();

        assert_eq!(value["_id"], id.to_string());
        assert_eq!(value["isVerified"], false);
        assert_eq!(value["authProvider"], "local");
        assert!(value.get("password_hash").is_none());
        assert!(value.get("passwordHash").is_none());
        assert!(value.get("password").is_none());
    }

    #[test]
    fn raw_user_serialization_skips_password_hash() {
        let value = serde_json::to_value(user()).unwrap();
        assert!(value.get("password_hash").is_none());
    }

    #[test]
    fn project_view_flattens_aggregates() {
        let liker = Uuid::new_v4();
        let row = ProjectRow {
            project: Project {
                id: Uuid::new_v4(),
                title: "Collab".into(),
                description: "A showcase".into(),
                long_description: None,
                owner_id: None,
                owner_name: "Ada".into(),
                technologies: vec!["Rust".into()],
                tags: vec!["Web".into()],
                category: "Web Development".into(),
                github_url: "https://github.com/ada/collab".into(),
                live_url: None,
                logo: String::new(),
                images: vec![],
                github_data: Some(sqlx::types::Json(GithubData::unavailable())),
                status: "active".into(),
                featured: false,
                views: 4,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            like_ids: vec![liker],
            likes_count: 1,
            comments_count: 2,
        };

        let value = serde_json::to_value(ProjectView::new(row, None, vec![])).unwrap();
        assert_eq!(value["likes"][0], liker.to_string());
        assert_eq!(value["likesCount"], 1);
        assert_eq!(value["commentsCount"], 2);
        assert_eq!(value["githubUrl"], "https://github.com/ada/collab");
        assert_eq!(value["githubData"]["language"], "Unknown");
        assert!(value["owner"].is_null());
    }
}
