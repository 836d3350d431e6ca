use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;

use crate::config;

/// Errors from DatabaseManager and the repositories built on it
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Turn a Postgres unique violation (SQLSTATE 23505) into a `Conflict`
    /// carrying the given client message; other errors pass through.
    pub fn unique_violation(err: sqlx::Error, message: impl Into<String>) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some("23505") {
                return DatabaseError::Conflict(message.into());
            }
        }
        DatabaseError::Sqlx(err)
    }
}

/// Process-wide holder of the Postgres connection pool
pub struct DatabaseManager {
    pool: Arc<RwLock<Option<PgPool>>>,
}

impl DatabaseManager {
    fn instance() -> &'static DatabaseManager {
        use std::sync::OnceLock;
        static INSTANCE: OnceLock<DatabaseManager> = OnceLock::new();
        INSTANCE.get_or_init(|| DatabaseManager {
            pool: Arc::new(RwLock::new(None)),
        })
    }

    /// Get the application pool, connecting on first use
    pub async fn pool() -> Result<PgPool, DatabaseError> {
        let manager = Self::instance();

        // Fast path: try read lock
        {
            let pool = manager.pool.read().await;
            if let Some(pool) = pool.as_ref() {
                return Ok(pool.clone());
            }
        }

        let mut slot = manager.pool.write().await;
        // Another task may have connected while we waited for the write lock
        if let Some(pool) = slot.as_ref() {
            return Ok(pool.clone());
        }

        let pool = Self::connect().await?;
        *slot = Some(pool.clone());
        Ok(pool)
    }

    async fn connect() -> Result<PgPool, DatabaseError> {
        let settings = &config::config().database;
        let url = settings
            .url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;

        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(Duration::from_secs(settings.connection_timeout))
            .connect(url)
            .await
            .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

        info!("Created database pool (max {} connections)", settings.max_connections);
        Ok(pool)
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check() -> Result<(), DatabaseError> {
        let pool = Self::pool().await?;
        sqlx::query("SELECT 1").execute(&pool).await?;
        Ok(())
    }

    /// Close and drop the pool (e.g., on shutdown)
    pub async fn close() {
        let manager = Self::instance();
        let mut slot = manager.pool.write().await;
        if let Some(pool) = slot.take() {
            pool.close().await;
            info!("Closed database pool");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_database_errors_are_not_conflicts() {
        let err = DatabaseError::unique_violation(sqlx::Error::RowNotFound, "duplicate");
        assert!(matches!(err, DatabaseError::Sqlx(sqlx::Error::RowNotFound)));
    }
}
