//! # warung-db: Storage Layer for Warung POS
//!
//! The durable relational collaborator behind the point of sale. SQLite via
//! sqlx, with:
//!
//! - [`pool`] - connection pool creation and the [`Database`] handle
//! - [`config`] - database configuration, including environment loading
//! - [`migrations`] - embedded schema migrations
//! - [`repository`] - products and transactions repositories
//! - [`feed`] - per-table change notifications (payload-less)
//! - [`error`] - [`DbError`] and the `DbResult` alias
//!
//! ## The Change Feed
//! Every successful write publishes a `(table, event kind)` pair on a
//! broadcast channel. There is deliberately no payload: consumers treat any
//! event as a cache-invalidation signal and re-read full snapshots, so
//! duplicate or dropped notifications can only cause redundant reads, never
//! wrong state.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use warung_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::from_env()?).await?;
//! let catalog = db.products().list().await?;
//! let mut changes = db.subscribe()?;
//! ```

pub mod config;
pub mod error;
pub mod feed;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use config::DbConfig;
pub use error::{DbError, DbResult};
pub use feed::{ChangeEvent, ChangeFeed, ChangeKind, ChangeTable};
pub use pool::Database;

pub use repository::product::ProductRepository;
pub use repository::transaction::TransactionRepository;
