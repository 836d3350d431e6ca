use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// A comment joined with the commenter's display fields
#[derive(Debug, Clone, FromRow)]
pub struct CommentRow {
    pub id: Uuid,
    pub project_id: Uuid,
    pub user_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub user_name: String,
    pub user_avatar: String,
}
