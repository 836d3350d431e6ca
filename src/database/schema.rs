//! Embedded DDL. Every statement is idempotent so it can run on each start.

use sqlx::PgPool;
use tracing::info;

use super::manager::DatabaseError;

const STATEMENTS: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS users (
        id               UUID PRIMARY KEY,
        name             VARCHAR(50)  NOT NULL,
        email            VARCHAR(320) NOT NULL UNIQUE,
        password_hash    TEXT,
        avatar           TEXT         NOT NULL DEFAULT '',
        bio              VARCHAR(500),
        year             TEXT         NOT NULL,
        branch           TEXT         NOT NULL,
        github_profile   TEXT,
        github_id        TEXT UNIQUE,
        github_username  TEXT,
        linkedin_profile TEXT,
        portfolio_url    TEXT,
        skills           TEXT[]       NOT NULL DEFAULT '{}',
        is_verified      BOOLEAN      NOT NULL DEFAULT FALSE,
        role             TEXT         NOT NULL DEFAULT 'student' CHECK (role IN ('student', 'admin')),
        auth_provider    TEXT         NOT NULL DEFAULT 'local' CHECK (auth_provider IN ('local', 'github')),
        created_at       TIMESTAMPTZ  NOT NULL DEFAULT now(),
        updated_at       TIMESTAMPTZ  NOT NULL DEFAULT now()
    )"#,
    r#"CREATE TABLE IF NOT EXISTS projects (
        id               UUID PRIMARY KEY,
        title            VARCHAR(100)  NOT NULL,
        description      VARCHAR(500)  NOT NULL,
        long_description VARCHAR(2000),
        owner_id         UUID REFERENCES users(id) ON DELETE SET NULL,
        owner_name       VARCHAR(50)   NOT NULL,
        technologies     TEXT[]        NOT NULL DEFAULT '{}',
        tags             TEXT[]        NOT NULL DEFAULT '{}',
        category         TEXT          NOT NULL,
        github_url       TEXT          NOT NULL UNIQUE,
        live_url         TEXT,
        logo             TEXT          NOT NULL DEFAULT '',
        images           TEXT[]        NOT NULL DEFAULT '{}',
        github_data      JSONB,
        status           TEXT          NOT NULL DEFAULT 'active' CHECK (status IN ('active', 'completed', 'archived')),
        featured         BOOLEAN       NOT NULL DEFAULT FALSE,
        views            INTEGER       NOT NULL DEFAULT 0,
        created_at       TIMESTAMPTZ   NOT NULL DEFAULT now(),
        updated_at       TIMESTAMPTZ   NOT NULL DEFAULT now()
    )"#,
    r#"CREATE TABLE IF NOT EXISTS project_collaborators (
        project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
        user_id    UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        PRIMARY KEY (project_id, user_id)
    )"#,
    r#"CREATE TABLE IF NOT EXISTS project_likes (
        project_id UUID        NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
        user_id    UUID        NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        PRIMARY KEY (project_id, user_id)
    )"#,
    r#"CREATE TABLE IF NOT EXISTS comments (
        id         UUID PRIMARY KEY,
        project_id UUID         NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
        user_id    UUID         NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        text       VARCHAR(500) NOT NULL,
        created_at TIMESTAMPTZ  NOT NULL DEFAULT now()
    )"#,
    r#"CREATE TABLE IF NOT EXISTS follows (
        follower_id  UUID        NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        following_id UUID        NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        created_at   TIMESTAMPTZ NOT NULL DEFAULT now(),
        PRIMARY KEY (follower_id, following_id),
        CHECK (follower_id <> following_id)
    )"#,
    "CREATE INDEX IF NOT EXISTS projects_owner_idx ON projects (owner_id)",
    "CREATE INDEX IF NOT EXISTS projects_category_idx ON projects (category)",
    "CREATE INDEX IF NOT EXISTS projects_featured_idx ON projects (featured)",
    "CREATE INDEX IF NOT EXISTS projects_created_at_idx ON projects (created_at DESC)",
    "CREATE INDEX IF NOT EXISTS projects_technologies_idx ON projects USING GIN (technologies)",
    "CREATE INDEX IF NOT EXISTS comments_project_idx ON comments (project_id, created_at DESC)",
    "CREATE INDEX IF NOT EXISTS follows_following_idx ON follows (following_id)",
];

/// Tables in child-before-parent order, for `reset`.
const TABLES: &[&str] = &[
    "follows",
    "comments",
    "project_likes",
    "project_collaborators",
    "projects",
    "users",
];

pub async fn migrate(pool: &PgPool) -> Result<(), DatabaseError> {
    let mut tx = pool.begin().await?;
    for statement in STATEMENTS {
        sqlx::query(statement).execute(&mut *tx).await?;
    }
    tx.commit().await?;
    info!("Database schema is up to date ({} statements)", STATEMENTS.len());
    Ok(())
}

/// Delete every row while keeping the schema in place.
pub async fn reset(pool: &PgPool) -> Result<u64, DatabaseError> {
    let mut tx = pool.begin().await?;
    let mut deleted = 0;
    for table in TABLES {
        let result = sqlx::query(&format!("DELETE FROM {}", table)).execute(&mut *tx).await?;
        deleted += result.rows_affected();
    }
    tx.commit().await?;
    info!("Deleted {} rows", deleted);
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_table_statement_is_idempotent() {
        for statement in STATEMENTS {
            assert!(
                statement.contains("IF NOT EXISTS"),
                "statement is not idempotent: {}",
                statement
            );
        }
    }

    #[test]
    fn reset_covers_every_table() {
        let created: Vec<&str> = STATEMENTS
            .iter()
            .filter_map(|s| s.strip_prefix("CREATE TABLE IF NOT EXISTS "))
            .filter_map(|s| s.split_whitespace().next())
            .collect();
        assert_eq!(created.len(), TABLES.len());
        for table in created {
            assert!(TABLES.contains(&table), "{} is missing from reset", table);
        }
    }
}
