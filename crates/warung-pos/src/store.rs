//! # The SaleStore Seam
//!
//! The narrow protocol the checkout pipeline speaks against the durable
//! store. Modeled after a remote multi-statement API: each call commits
//! independently, and the orchestrator sequences them with blocking awaits.
//!
//! Defining the seam as a trait keeps the orchestrator testable against a
//! mock (call counts, injected step failures) while production wires in
//! [`warung_db::Database`].

use async_trait::async_trait;

use warung_core::{NewTransaction, NewTransactionItem, Transaction};
use warung_db::{Database, DbResult};

/// Store operations the checkout pipeline needs.
#[async_trait]
pub trait SaleStore: Send + Sync {
    /// Step 1: persist the transaction row. The store assigns id and
    /// timestamp.
    async fn insert_transaction(&self, new: &NewTransaction) -> DbResult<Transaction>;

    /// Step 2: persist all line items for a transaction, as one atomic
    /// batch.
    async fn insert_items(
        &self,
        transaction_id: i64,
        items: &[NewTransactionItem],
    ) -> DbResult<()>;

    /// Step 3 (per line): relative server-side stock decrement.
    async fn decrement_stock(&self, product_id: i64, quantity: i64) -> DbResult<()>;

    /// Audit: transactions committed without line items (partial commits
    /// awaiting manual reconciliation).
    async fn find_orphaned(&self) -> DbResult<Vec<Transaction>>;
}

#[async_trait]
impl SaleStore for Database {
    async fn insert_transaction(&self, new: &NewTransaction) -> DbResult<Transaction> {
        self.transactions().insert_transaction(new).await
    }

    async fn insert_items(
        &self,
        transaction_id: i64,
        items: &[NewTransactionItem],
    ) -> DbResult<()> {
        self.transactions().insert_items(transaction_id, items).await
    }

    async fn decrement_stock(&self, product_id: i64, quantity: i64) -> DbResult<()> {
        self.products().decrement_stock(product_id, quantity).await
    }

    async fn find_orphaned(&self) -> DbResult<Vec<Transaction>> {
        self.transactions().find_orphaned().await
    }
}
