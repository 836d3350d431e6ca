use std::collections::HashMap;

use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::manager::{DatabaseError, DatabaseManager};
use super::models::{GithubLink, NewUser, ProfileUpdate, User, UserSummary};
use super::like_pattern;

const SUMMARY_COLUMNS: &str = "u.id, u.name, u.avatar, u.year, u.branch, u.github_profile";

/// Listing filters for `GET /api/users`
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub search: Option<String>,
    pub year: Option<String>,
    pub branch: Option<String>,
}

impl UserFilter {
    fn apply<'a>(&self, qb: &mut QueryBuilder<'a, Postgres>) {
        if let Some(search) = self.search.as_deref().filter(|s| !s.trim().is_empty()) {
            let pattern = like_pattern(search.trim());
            qb.push(" AND (name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR bio ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR EXISTS (SELECT 1 FROM unnest(skills) AS skill WHERE skill ILIKE ")
                .push_bind(pattern)
                .push("))");
        }
        if let Some(year) = self.year.as_deref().filter(|v| is_selective(v)) {
            qb.push(" AND year = ").push_bind(year.to_string());
        }
        if let Some(branch) = self.branch.as_deref().filter(|v| is_selective(v)) {
            qb.push(" AND branch = ").push_bind(branch.to_string());
        }
    }
}

/// `all` and empty values mean "no filter"
pub(crate) fn is_selective(value: &str) -> bool {
    !value.is_empty() && value != "all"
}

/// Follower and following id lists keyed by user
#[derive(Debug, Default)]
pub struct FollowGraph {
    followers: HashMap<Uuid, Vec<Uuid>>,
    following: HashMap<Uuid, Vec<Uuid>>,
}

impl FollowGraph {
    pub fn followers_of(&self, id: Uuid) -> Vec<Uuid> {
        self.followers.get(&id).cloned().unwrap_or_default()
    }

    pub fn following_of(&self, id: Uuid) -> Vec<Uuid> {
        self.following.get(&id).cloned().unwrap_or_default()
    }
}

pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Repository over the shared application pool
    pub async fn shared() -> Result<Self, DatabaseError> {
        Ok(Self::new(DatabaseManager::pool().await?))
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn get(&self, id: Uuid) -> Result<User, DatabaseError> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("User not found".to_string()))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email.trim().to_lowercase())
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn find_by_github_id(&self, github_id: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE github_id = $1")
            .bind(github_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn create(&self, new: NewUser) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>(
            r#"INSERT INTO users
                (id, name, email, password_hash, avatar, bio, year, branch, skills,
                 github_id, github_username, auth_provider)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
               RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(new.name)
        .bind(new.email.trim().to_lowercase())
        .bind(new.password_hash)
        .bind(new.avatar)
        .bind(new.bio)
        .bind(new.year)
        .bind(new.branch)
        .bind(new.skills)
        .bind(new.github_id)
        .bind(new.github_username)
        .bind(new.auth_provider)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DatabaseError::unique_violation(e, "User with this email already exists"))
    }

    pub async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>(
            r#"UPDATE users SET
                name             = COALESCE($2, name),
                bio              = COALESCE($3, bio),
                year             = COALESCE($4, year),
                branch           = COALESCE($5, branch),
                github_profile   = COALESCE($6, github_profile),
                linkedin_profile = COALESCE($7, linkedin_profile),
                portfolio_url    = COALESCE($8, portfolio_url),
                skills           = COALESCE($9, skills),
                avatar           = COALESCE($10, avatar),
                updated_at       = now()
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(update.name)
        .bind(update.bio)
        .bind(update.year)
        .bind(update.branch)
        .bind(update.github_profile)
        .bind(update.linkedin_profile)
        .bind(update.portfolio_url)
        .bind(update.skills)
        .bind(update.avatar)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound("User not found".to_string()))
    }

    pub async fn link_github(&self, id: Uuid, link: GithubLink) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>(
            r#"UPDATE users SET
                github_id       = $2,
                github_username = $3,
                avatar          = COALESCE($4, avatar),
                auth_provider   = CASE WHEN $5 THEN 'github' ELSE auth_provider END,
                updated_at      = now()
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(link.github_id)
        .bind(link.github_username)
        .bind(link.avatar)
        .bind(link.switch_provider)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DatabaseError::unique_violation(e, "GitHub account is already linked to another user"))?
        .ok_or_else(|| DatabaseError::NotFound("User not found".to_string()))
    }

    /// Change a role by email. Returns `None` when no such user exists.
    pub async fn set_role(&self, email: &str, role: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET role = $2, updated_at = now() WHERE email = $1 RETURNING *",
        )
        .bind(email.trim().to_lowercase())
        .bind(role)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// One page of users, newest first, plus the unpaged total
    pub async fn list(&self, filter: &UserFilter, limit: i64, offset: i64) -> Result<(Vec<User>, i64), DatabaseError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users WHERE TRUE");
        filter.apply(&mut count);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new("SELECT * FROM users WHERE TRUE");
        filter.apply(&mut select);
        select
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);
        let users = select.build_query_as::<User>().fetch_all(&self.pool).await?;

        Ok((users, total))
    }

    /// Follow edges touching any of `ids`, in follow order
    pub async fn follow_graph(&self, ids: &[Uuid]) -> Result<FollowGraph, DatabaseError> {
        let mut graph = FollowGraph::default();
        if ids.is_empty() {
            return Ok(graph);
        }

        let edges: Vec<(Uuid, Uuid)> = sqlx::query_as(
            r#"SELECT follower_id, following_id FROM follows
               WHERE follower_id = ANY($1) OR following_id = ANY($1)
               ORDER BY created_at"#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        for (follower, following) in edges {
            graph.followers.entry(following).or_default().push(follower);
            graph.following.entry(follower).or_default().push(following);
        }
        Ok(graph)
    }

    pub async fn followers(&self, id: Uuid) -> Result<Vec<UserSummary>, DatabaseError> {
        let query = format!(
            "SELECT {} FROM follows f JOIN users u ON u.id = f.follower_id WHERE f.following_id = $1 ORDER BY f.created_at",
            SUMMARY_COLUMNS
        );
        let rows = sqlx::query_as::<_, UserSummary>(&query)
            .bind(id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn following(&self, id: Uuid) -> Result<Vec<UserSummary>, DatabaseError> {
        let query = format!(
            "SELECT {} FROM follows f JOIN users u ON u.id = f.following_id WHERE f.follower_id = $1 ORDER BY f.created_at",
            SUMMARY_COLUMNS
        );
        let rows = sqlx::query_as::<_, UserSummary>(&query)
            .bind(id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Returns false when the edge already existed.
    pub async fn follow(&self, follower: Uuid, following: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query(
            "INSERT INTO follows (follower_id, following_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(follower)
        .bind(following)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Returns false when there was nothing to remove.
    pub async fn unfollow(&self, follower: Uuid, following: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND following_id = $2")
            .bind(follower)
            .bind(following)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn summaries(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, UserSummary>, DatabaseError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let query = format!("SELECT {} FROM users u WHERE u.id = ANY($1)", SUMMARY_COLUMNS);
        let rows = sqlx::query_as::<_, UserSummary>(&query)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|s| (s.id, s)).collect())
    }
}
