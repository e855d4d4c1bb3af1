//! # Database Error Types
//!
//! Errors for store operations. Two categories matter to callers:
//!
//! - **Configuration faults** (`ConfigurationMissing`, `ConfigurationInvalid`)
//!   are operator-actionable and recoverable without touching data. They are
//!   kept distinct from transport failures so the UI can show a blocking
//!   "fix your settings" state instead of a generic error toast.
//! - **Everything else** maps from sqlx at the boundary, with constraint
//!   violations pulled out of the driver message for useful feedback.

use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Connection settings are absent entirely (e.g. env var unset).
    /// Recoverable by an operator; no data was touched.
    #[error("Store not configured: {0}")]
    ConfigurationMissing(String),

    /// Connection settings are present but unusable.
    #[error("Store configuration invalid: {0}")]
    ConfigurationInvalid(String),

    /// Entity not found.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    #[error("Duplicate value: {0}")]
    UniqueViolation(String),

    /// Foreign key constraint violation.
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// CHECK constraint violation (negative price, stock below -1, ...).
    #[error("Check constraint violation: {0}")]
    CheckViolation(String),

    /// Could not open or reach the database.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// The change feed has been shut down; callers should fall back to
    /// manual refresh.
    #[error("Change feed is closed")]
    FeedClosed,

    /// Anything else.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }
}

/// Maps sqlx errors onto [`DbError`], sniffing SQLite constraint messages.
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message().to_string();
                if msg.contains("UNIQUE constraint failed") {
                    DbError::UniqueViolation(msg)
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation(msg)
                } else if msg.contains("CHECK constraint failed") {
                    DbError::CheckViolation(msg)
                } else {
                    DbError::QueryFailed(msg)
                }
            }

            sqlx::Error::PoolTimedOut => {
                DbError::ConnectionFailed("connection pool exhausted".to_string())
            }
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = DbError::not_found("Product", 42);
        assert_eq!(err.to_string(), "Product not found: 42");
    }

    #[test]
    fn test_configuration_errors_are_distinct() {
        let missing = DbError::ConfigurationMissing("WARUNG_DATABASE_PATH".into());
        let invalid = DbError::ConfigurationInvalid("path is blank".into());
        assert!(matches!(missing, DbError::ConfigurationMissing(_)));
        assert!(matches!(invalid, DbError::ConfigurationInvalid(_)));
        assert_ne!(missing.to_string(), invalid.to_string());
    }
}
