//! # Database Migrations
//!
//! Schema migrations embedded at compile time from `migrations/sqlite/` at
//! the workspace root. Idempotent: applied migrations are tracked in the
//! `_sqlx_migrations` table and never re-run. New schema changes get a new
//! numbered file; existing files are never edited.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Runs all pending migrations in order.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    info!("Checking for pending migrations");
    MIGRATOR.run(pool).await?;
    info!("All migrations applied");
    Ok(())
}
