use serde::Serialize;
use uuid::Uuid;

use crate::api::{PublicUser, UserSummary};
use crate::auth::{generate_jwt, Claims};
use crate::database::models::User;
use crate::database::UserRepository;
use crate::error::ApiError;

/// `{user, token}` payload returned by register and login
#[derive(Debug, Serialize)]
pub struct AuthPayload {
    pub user: PublicUser,
    pub token: String,
}

/// Parse a path id. Malformed ids answer like unknown ones.
pub fn parse_id(raw: &str, not_found: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found(not_found))
}

pub fn issue_token(user: &User) -> Result<String, ApiError> {
    Ok(generate_jwt(&Claims::for_user(user)?)?)
}

/// User with follower and following id lists
pub async fn user_with_ids(users: &UserRepository, user: User) -> Result<PublicUser, ApiError> {
    let graph = users.follow_graph(&[user.id]).await?;
    let (followers, following) = (graph.followers_of(user.id), graph.following_of(user.id));
    Ok(PublicUser::new(user, followers, following))
}

/// User with follower and following summaries, for profile pages
pub async fn user_with_summaries(users: &UserRepository, user: User) -> Result<PublicUser<UserSummary>, ApiError> {
    let followers = users.followers(user.id).await?;
    let following = users.following(user.id).await?;
    Ok(PublicUser::new(user, followers, following))
}

/// Trim and drop empty strings from optional text fields
pub fn clean(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Trim but keep empty strings, which clear optional fields on update
pub fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}
