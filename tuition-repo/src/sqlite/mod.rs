//! SQLite repository adapter.
#![allow(clippy::collapsible_if)]

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;

use tuition_types::{DomainError, RepoError};

mod catalog;
mod payment;
mod schedule;
mod student;

// ─────────────────────────────────────────────────────────────────────────────
// SQLite Repository
// ─────────────────────────────────────────────────────────────────────────────

/// SQLite repository implementation.
pub struct SqliteRepo {
    pool: SqlitePool,
}

impl SqliteRepo {
    /// Creates a new SQLite repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            let path = path.split('?').next().unwrap_or(path);
            if path != ":memory:" {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        // An in-memory database lives and dies with its connection, so the
        // pool must hold exactly one and never recycle it.
        let pool = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new().connect_with(options).await?
        };

        let repo = Self { pool };
        repo.create_schema().await?;
        tracing::debug!(database_url, "sqlite schema ready");

        Ok(repo)
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates the database schema (idempotent).
    pub async fn create_schema(&self) -> Result<(), RepoError> {
        let ddl = include_str!("../../migrations/0001_create_tables.sql");
        sqlx::query(ddl)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Shared helpers
// ─────────────────────────────────────────────────────────────────────────────

pub(crate) fn db_err(e: sqlx::Error) -> RepoError {
    RepoError::Database(e.to_string())
}

pub(crate) fn tx_err(e: sqlx::Error) -> RepoError {
    RepoError::Transaction(e.to_string())
}

/// Maps constraint violations of a write to `Conflict`.
pub(crate) fn write_err(e: sqlx::Error) -> RepoError {
    if let Some(db) = e.as_database_error() {
        if db.is_unique_violation() {
            return RepoError::Conflict(format!("Duplicate value: {}", db.message()));
        }
        if db.is_foreign_key_violation() {
            return RepoError::Conflict(
                "Operation violates a reference to another record".to_string(),
            );
        }
    }
    RepoError::Database(e.to_string())
}

/// Rejects blank required text.
pub(crate) fn require_name(value: &str, what: &str) -> Result<(), RepoError> {
    if value.trim().is_empty() {
        return Err(DomainError::ValidationError(format!("{what} cannot be empty")).into());
    }
    Ok(())
}

/// Wraps a user-supplied search term for `LIKE`.
pub(crate) fn like(term: &str) -> String {
    format!("%{}%", term.trim())
}

/// Trims a filter value, treating blank as absent.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Primary branch of a user: the first membership recorded.
pub(crate) const PRIMARY_BRANCH_NAME: &str = "(SELECT b.branch_name FROM user_branch ub \
     JOIN branch b ON b.id = ub.branch_id WHERE ub.user_id = u.id ORDER BY ub.id LIMIT 1)";

/// `ORDER BY` fragment putting Saturday first.
pub(crate) const DAY_ORDER: &str = "CASE s.day WHEN 'Saturday' THEN 0 WHEN 'Sunday' THEN 1 \
     WHEN 'Monday' THEN 2 WHEN 'Tuesday' THEN 3 WHEN 'Wednesday' THEN 4 \
     WHEN 'Thursday' THEN 5 WHEN 'Friday' THEN 6 ELSE 7 END";
