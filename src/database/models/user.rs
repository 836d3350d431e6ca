use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const AUTH_PROVIDER_LOCAL: &str = "local";
pub const AUTH_PROVIDER_GITHUB: &str = "github";

/// Placeholder for profile fields GitHub sign-ups have not filled in yet
pub const NOT_SPECIFIED: &str = "Not specified";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub avatar: String,
    pub bio: Option<String>,
    pub year: String,
    pub branch: String,
    pub github_profile: Option<String>,
    pub github_id: Option<String>,
    pub github_username: Option<String>,
    pub linkedin_profile: Option<String>,
    pub portfolio_url: Option<String>,
    pub skills: Vec<String>,
    pub is_verified: bool,
    pub role: String,
    pub auth_provider: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The handful of user fields embedded in other records
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub avatar: String,
    pub year: String,
    pub branch: String,
    pub github_profile: Option<String>,
}

/// Insert payload for the users table
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub avatar: String,
    pub bio: Option<String>,
    pub year: String,
    pub branch: String,
    pub skills: Vec<String>,
    pub github_id: Option<String>,
    pub github_username: Option<String>,
    pub auth_provider: String,
}

/// Partial profile update; `None` leaves the column untouched
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub year: Option<String>,
    pub branch: Option<String>,
    pub github_profile: Option<String>,
    pub linkedin_profile: Option<String>,
    pub portfolio_url: Option<String>,
    pub skills: Option<Vec<String>>,
    pub avatar: Option<String>,
}

/// GitHub identity to attach to an existing account
#[derive(Debug, Clone)]
pub struct GithubLink {
    pub github_id: String,
    pub github_username: String,
    pub avatar: Option<String>,
    /// Mark the account as GitHub-authenticated (first link of an email account)
    pub switch_provider: bool,
}
