//! # Database Pool Management
//!
//! Connection pool creation and the [`Database`] handle that hands out
//! repositories and change feed subscriptions.
//!
//! SQLite runs in WAL mode (readers don't block writers), NORMAL synchronous
//! (safe from corruption, may lose the last transaction on power loss), with
//! foreign keys enabled.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::config::DbConfig;
use crate::error::{DbError, DbResult};
use crate::feed::{ChangeEvent, ChangeFeed};
use crate::migrations;
use crate::repository::product::ProductRepository;
use crate::repository::transaction::TransactionRepository;

/// Main database handle.
///
/// Cheap to clone: clones share the pool and the change feed. Repositories
/// are created on demand and publish to the shared feed after every
/// successful write, so any clone's subscribers see all changes.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
    feed: ChangeFeed,
}

impl Database {
    /// Opens the pool, applies migrations (if configured), and returns a
    /// ready handle.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(path = %config.database_path.display(), "Initializing database");

        let base_options = if config.is_in_memory() {
            SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
        } else {
            let url = format!("sqlite://{}?mode=rwc", config.database_path.display());
            SqliteConnectOptions::from_str(&url)
                .map_err(|e| DbError::ConfigurationInvalid(e.to_string()))?
                .create_if_missing(true)
        };

        let connect_options = base_options
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true);

        debug!("Connection options configured");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        let db = Database {
            pool,
            feed: ChangeFeed::new(),
        };

        if config.run_migrations {
            migrations::run_migrations(&db.pool).await?;
        }

        info!(max_connections = config.max_connections, "Database ready");
        Ok(db)
    }

    /// Returns the product repository.
    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone(), self.feed.clone())
    }

    /// Returns the transaction repository.
    pub fn transactions(&self) -> TransactionRepository {
        TransactionRepository::new(self.pool.clone(), self.feed.clone())
    }

    /// Subscribes to the change feed.
    ///
    /// Fails with [`DbError::FeedClosed`] after [`Database::close`]; callers
    /// degrade to manual refresh.
    pub fn subscribe(&self) -> DbResult<broadcast::Receiver<ChangeEvent>> {
        self.feed.subscribe()
    }

    /// The shared change feed handle. Closing it stops notifications while
    /// the pool keeps serving queries.
    pub fn feed(&self) -> &ChangeFeed {
        &self.feed
    }

    /// Raw pool access for queries the repositories don't cover.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Whether the database answers a trivial query.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    /// Shuts down the change feed and the connection pool.
    pub async fn close(&self) {
        info!("Closing database");
        self.feed.close();
        self.pool.close().await;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database_migrates_and_responds() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.health_check().await);

        // Schema exists after migrations
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_subscribe_fails_after_close() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.close().await;
        assert!(matches!(db.subscribe(), Err(DbError::FeedClosed)));
    }
}
