//! # Live Views
//!
//! Cached read-side snapshots the UI renders from: the product catalog, the
//! sale history, and the two analytics summaries derived from it.
//!
//! Change events carry no payload, so every refresh re-reads the full
//! snapshot from the store and recomputes the derived summaries. Refreshes
//! are idempotent: applying the same snapshot twice leaves the views
//! unchanged, which is what makes a lagged feed recoverable by a single
//! catch-up refresh.

use tokio::sync::RwLock;
use tracing::debug;

use warung_core::analytics::{self, DailySales, TopProduct};
use warung_core::{Product, Transaction};
use warung_db::{Database, DbResult};

/// Read-side snapshots, refreshed by the change feed listener or by an
/// explicit (manual) refresh call.
#[derive(Debug, Default)]
pub struct LiveViews {
    catalog: RwLock<Vec<Product>>,
    history: RwLock<Vec<Transaction>>,
    daily_sales: RwLock<Vec<DailySales>>,
    top_products: RwLock<Vec<TopProduct>>,
}

impl LiveViews {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-reads the product catalog.
    pub async fn refresh_catalog(&self, db: &Database) -> DbResult<()> {
        let products = db.products().list().await?;
        debug!(count = products.len(), "Catalog view refreshed");
        *self.catalog.write().await = products;
        Ok(())
    }

    /// Re-reads the sale history and recomputes both analytics summaries
    /// from the fresh snapshot.
    pub async fn refresh_history(&self, db: &Database) -> DbResult<()> {
        let transactions = db.transactions().list().await?;
        let items = db.transactions().list_items().await?;
        debug!(
            transactions = transactions.len(),
            items = items.len(),
            "History view refreshed"
        );

        *self.daily_sales.write().await = analytics::daily_sales(&transactions);
        *self.top_products.write().await = analytics::top_products(&items);
        *self.history.write().await = transactions;
        Ok(())
    }

    /// Refreshes everything. Used at startup and after a lagged feed.
    pub async fn refresh_all(&self, db: &Database) -> DbResult<()> {
        self.refresh_catalog(db).await?;
        self.refresh_history(db).await
    }

    pub async fn catalog(&self) -> Vec<Product> {
        self.catalog.read().await.clone()
    }

    pub async fn history(&self) -> Vec<Transaction> {
        self.history.read().await.clone()
    }

    pub async fn daily_sales(&self) -> Vec<DailySales> {
        self.daily_sales.read().await.clone()
    }

    pub async fn top_products(&self) -> Vec<TopProduct> {
        self.top_products.read().await.clone()
    }
}
