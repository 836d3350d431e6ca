use std::collections::HashMap;

use sqlx::{types::Json, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::manager::{DatabaseError, DatabaseManager};
use super::models::{CommentRow, GithubData, NewProject, Project, ProjectRow, ProjectUpdate, UserSummary};
use super::users::is_selective;
use super::like_pattern;
use crate::api::ProjectView;

const PROJECT_ROW_SELECT: &str = r#"SELECT p.*,
    COALESCE(
        (SELECT array_agg(l.user_id ORDER BY l.created_at) FROM project_likes l WHERE l.project_id = p.id),
        '{}'::uuid[]
    ) AS like_ids,
    (SELECT COUNT(*) FROM project_likes l WHERE l.project_id = p.id) AS likes_count,
    (SELECT COUNT(*) FROM comments c WHERE c.project_id = p.id) AS comments_count
FROM projects p"#;

const COMMENT_SELECT: &str = r#"SELECT c.id, c.project_id, c.user_id, c.text, c.created_at,
    u.name AS user_name, u.avatar AS user_avatar
FROM comments c JOIN users u ON u.id = c.user_id"#;

/// Listing filters for `GET /api/projects` and `GET /api/projects/my-projects`
#[derive(Debug, Clone, Default)]
pub struct ProjectFilter {
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub search: Option<String>,
    pub featured: bool,
    pub owner_id: Option<Uuid>,
}

impl ProjectFilter {
    fn apply<'a>(&self, qb: &mut QueryBuilder<'a, Postgres>) {
        if let Some(category) = self.category.as_deref().filter(|v| is_selective(v)) {
            qb.push(" AND p.category = ").push_bind(category.to_string());
        }
        if !self.tags.is_empty() {
            qb.push(" AND p.tags && ").push_bind(self.tags.clone());
        }
        if let Some(search) = self.search.as_deref().filter(|s| !s.trim().is_empty()) {
            let pattern = like_pattern(search.trim());
            qb.push(" AND (p.title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR p.description ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR EXISTS (SELECT 1 FROM unnest(p.technologies || p.tags) AS term WHERE term ILIKE ")
                .push_bind(pattern)
                .push("))");
        }
        if self.featured {
            qb.push(" AND p.featured");
        }
        if let Some(owner_id) = self.owner_id {
            qb.push(" AND p.owner_id = ").push_bind(owner_id);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectSort {
    #[default]
    CreatedAt,
    Views,
    Likes,
    Stars,
    Updated,
}

impl ProjectSort {
    /// Unknown values fall back to newest first.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("views") => Self::Views,
            Some("likes") => Self::Likes,
            Some("stars") => Self::Stars,
            Some("updated") => Self::Updated,
            _ => Self::CreatedAt,
        }
    }

    fn order_by(self) -> &'static str {
        match self {
            Self::CreatedAt => " ORDER BY p.created_at DESC",
            Self::Views => " ORDER BY p.views DESC, p.created_at DESC",
            Self::Likes => " ORDER BY likes_count DESC, p.created_at DESC",
            Self::Stars => " ORDER BY COALESCE((p.github_data->>'stars')::bigint, 0) DESC, p.created_at DESC",
            Self::Updated => {
                " ORDER BY (p.github_data->>'lastUpdated')::timestamptz DESC NULLS LAST, p.created_at DESC"
            }
        }
    }
}

pub struct ProjectRepository {
    pool: PgPool,
}

impl ProjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn shared() -> Result<Self, DatabaseError> {
        Ok(Self::new(DatabaseManager::pool().await?))
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<Project>, DatabaseError> {
        let project = sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(project)
    }

    pub async fn get(&self, id: Uuid) -> Result<Project, DatabaseError> {
        self.find(id).await?.ok_or_else(not_found)
    }

    pub async fn find_row(&self, id: Uuid) -> Result<Option<ProjectRow>, DatabaseError> {
        let query = format!("{} WHERE p.id = $1", PROJECT_ROW_SELECT);
        let row = sqlx::query_as::<_, ProjectRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Count a view and return the project as it reads afterwards
    pub async fn record_view(&self, id: Uuid) -> Result<ProjectRow, DatabaseError> {
        let result = sqlx::query("UPDATE projects SET views = views + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(not_found());
        }
        self.find_row(id).await?.ok_or_else(not_found)
    }

    pub async fn list(
        &self,
        filter: &ProjectFilter,
        sort: ProjectSort,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<ProjectRow>, i64), DatabaseError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM projects p WHERE TRUE");
        filter.apply(&mut count);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(PROJECT_ROW_SELECT);
        select.push(" WHERE TRUE");
        filter.apply(&mut select);
        select
            .push(sort.order_by())
            .push(" LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);
        let rows = select.build_query_as::<ProjectRow>().fetch_all(&self.pool).await?;

        Ok((rows, total))
    }

    pub async fn create(&self, new: NewProject) -> Result<ProjectRow, DatabaseError> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"INSERT INTO projects
                (id, title, description, long_description, owner_id, owner_name,
                 technologies, tags, category, github_url, live_url, logo, github_data)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)"#,
        )
        .bind(id)
        .bind(new.title)
        .bind(new.description)
        .bind(new.long_description)
        .bind(new.owner_id)
        .bind(new.owner_name)
        .bind(new.technologies)
        .bind(new.tags)
        .bind(new.category)
        .bind(new.github_url)
        .bind(new.live_url)
        .bind(new.logo)
        .bind(Json(new.github_data))
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::unique_violation(e, "A project with this GitHub URL already exists"))?;

        self.find_row(id).await?.ok_or_else(not_found)
    }

    /// Absent fields keep their value; an empty `long_description` or `live_url` clears it
    pub async fn update(&self, id: Uuid, update: ProjectUpdate) -> Result<ProjectRow, DatabaseError> {
        let result = sqlx::query(
            r#"UPDATE projects SET
                title            = COALESCE($2, title),
                description      = COALESCE($3, description),
                long_description = CASE WHEN $4::text IS NULL THEN long_description ELSE NULLIF($4, '') END,
                technologies     = COALESCE($5, technologies),
                tags             = COALESCE($6, tags),
                category         = COALESCE($7, category),
                github_url       = COALESCE($8, github_url),
                live_url         = CASE WHEN $9::text IS NULL THEN live_url ELSE NULLIF($9, '') END,
                logo             = COALESCE($10, logo),
                status           = COALESCE($11, status),
                images           = images || $12,
                updated_at       = now()
               WHERE id = $1"#,
        )
        .bind(id)
        .bind(update.title)
        .bind(update.description)
        .bind(update.long_description)
        .bind(update.technologies)
        .bind(update.tags)
        .bind(update.category)
        .bind(update.github_url)
        .bind(update.live_url)
        .bind(update.logo)
        .bind(update.status)
        .bind(update.new_images)
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::unique_violation(e, "A project with this GitHub URL already exists"))?;

        if result.rows_affected() == 0 {
            return Err(not_found());
        }
        self.find_row(id).await?.ok_or_else(not_found)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Flip the caller's like. Returns whether the project is now liked and the new count.
    pub async fn toggle_like(&self, project_id: Uuid, user_id: Uuid) -> Result<(bool, i64), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM project_likes WHERE project_id = $1 AND user_id = $2")
            .bind(project_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let liked = removed == 0;
        if liked {
            sqlx::query("INSERT INTO project_likes (project_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING")
                .bind(project_id)
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
        }

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM project_likes WHERE project_id = $1")
            .bind(project_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok((liked, count))
    }

    pub async fn add_comment(&self, project_id: Uuid, user_id: Uuid, text: &str) -> Result<CommentRow, DatabaseError> {
        let id = Uuid::new_v4();
        sqlx::query("INSERT INTO comments (id, project_id, user_id, text) VALUES ($1, $2, $3, $4)")
            .bind(id)
            .bind(project_id)
            .bind(user_id)
            .bind(text)
            .execute(&self.pool)
            .await?;

        let query = format!("{} WHERE c.id = $1", COMMENT_SELECT);
        let row = sqlx::query_as::<_, CommentRow>(&query)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    /// Comments on a project, newest first
    pub async fn comments(&self, project_id: Uuid) -> Result<Vec<CommentRow>, DatabaseError> {
        let query = format!("{} WHERE c.project_id = $1 ORDER BY c.created_at DESC", COMMENT_SELECT);
        let rows = sqlx::query_as::<_, CommentRow>(&query)
            .bind(project_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn set_github_data(&self, id: Uuid, data: &GithubData) -> Result<(), DatabaseError> {
        let result = sqlx::query("UPDATE projects SET github_data = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(Json(data))
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(not_found());
        }
        Ok(())
    }

    pub async fn set_featured(&self, id: Uuid, featured: bool) -> Result<Option<Project>, DatabaseError> {
        let project = sqlx::query_as::<_, Project>(
            "UPDATE projects SET featured = $2, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(featured)
        .fetch_optional(&self.pool)
        .await?;
        Ok(project)
    }

    /// Collaborator summaries for each of `project_ids`
    pub async fn collaborators(&self, project_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<UserSummary>>, DatabaseError> {
        let mut map: HashMap<Uuid, Vec<UserSummary>> = HashMap::new();
        if project_ids.is_empty() {
            return Ok(map);
        }

        let rows: Vec<CollaboratorRow> = sqlx::query_as(
            r#"SELECT pc.project_id, u.id, u.name, u.avatar, u.year, u.branch, u.github_profile
               FROM project_collaborators pc JOIN users u ON u.id = pc.user_id
               WHERE pc.project_id = ANY($1)
               ORDER BY u.name"#,
        )
        .bind(project_ids)
        .fetch_all(&self.pool)
        .await?;

        for row in rows {
            map.entry(row.project_id).or_default().push(row.user);
        }
        Ok(map)
    }

    /// Attach owner and collaborator summaries to raw rows
    pub async fn views(&self, rows: Vec<ProjectRow>) -> Result<Vec<ProjectView>, DatabaseError> {
        let project_ids: Vec<Uuid> = rows.iter().map(|r| r.project.id).collect();
        let mut owner_ids: Vec<Uuid> = rows.iter().filter_map(|r| r.project.owner_id).collect();
        owner_ids.sort_unstable();
        owner_ids.dedup();

        let owners = super::users::UserRepository::new(self.pool.clone())
            .summaries(&owner_ids)
            .await?;
        let mut collaborators = self.collaborators(&project_ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let owner = row.project.owner_id.and_then(|id| owners.get(&id).cloned());
                let collabs = collaborators.remove(&row.project.id).unwrap_or_default();
                ProjectView::new(row, owner, collabs)
            })
            .collect())
    }

    pub async fn view(&self, row: ProjectRow) -> Result<ProjectView, DatabaseError> {
        let mut views = self.views(vec![row]).await?;
        views.pop().ok_or_else(not_found)
    }
}

#[derive(sqlx::FromRow)]
struct CollaboratorRow {
    project_id: Uuid,
    #[sqlx(flatten)]
    user: UserSummary,
}

fn not_found() -> DatabaseError {
    DatabaseError::NotFound("Project not found".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_parsing_falls_back_to_newest() {
        assert_eq!(ProjectSort::parse(Some("views")), ProjectSort::Views);
        assert_eq!(ProjectSort::parse(Some("likes")), ProjectSort::Likes);
        assert_eq!(ProjectSort::parse(Some("stars")), ProjectSort::Stars);
        assert_eq!(ProjectSort::parse(Some("updated")), ProjectSort::Updated);
        assert_eq!(ProjectSort::parse(Some("createdAt")), ProjectSort::CreatedAt);
        assert_eq!(ProjectSort::parse(Some("bogus")), ProjectSort::CreatedAt);
        assert_eq!(ProjectSort::parse(None), ProjectSort::CreatedAt);
    }

    #[test]
    fn filter_builds_expected_conditions() {
        let owner = Uuid::new_v4();
        let filter = ProjectFilter {
            category: Some("Web Development".into()),
            tags: vec!["AI".into(), "Web".into()],
            search: Some("chat".into()),
            featured: true,
            owner_id: Some(owner),
        };
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM projects p WHERE TRUE");
        filter.apply(&mut qb);
        let sql = qb.sql();

        assert!(sql.contains("p.category = $1"));
        assert!(sql.contains("p.tags && $2"));
        assert!(sql.contains("p.title ILIKE $3"));
        assert!(sql.contains("term ILIKE $5"));
        assert!(sql.contains("AND p.featured"));
        assert!(sql.contains("p.owner_id = $6"));
    }

    #[test]
    fn category_all_is_ignored() {
        let filter = ProjectFilter {
            category: Some("all".into()),
            ..Default::default()
        };
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM projects p WHERE TRUE");
        filter.apply(&mut qb);
        assert_eq!(qb.sql(), "SELECT COUNT(*) FROM projects p WHERE TRUE");
    }

    #[test]
    fn stars_sort_reads_json_column() {
        assert!(ProjectSort::Stars.order_by().contains("github_data->>'stars'"));
        assert!(ProjectSort::Updated.order_by().contains("NULLS LAST"));
    }
}
