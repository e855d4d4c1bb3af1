//! # Transaction Repository
//!
//! The append-only sale history: transactions and their line items. There
//! are deliberately no update or delete operations here - once committed, a
//! sale is an audit record.
//!
//! ## Write Shape
//! The checkout orchestrator calls [`TransactionRepository::insert_transaction`]
//! and [`TransactionRepository::insert_items`] as two separate store calls
//! (mirroring a remote multi-statement API, where each call commits
//! independently). The item batch itself is atomic: within `insert_items`
//! all lines land in one database transaction or none do, so a failed batch
//! leaves a cleanly detectable orphaned transaction rather than a partial
//! item list. [`TransactionRepository::find_orphaned`] surfaces those
//! orphans for manual reconciliation.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::feed::{ChangeFeed, ChangeKind, ChangeTable};
use warung_core::{NewTransaction, NewTransactionItem, Transaction, TransactionItem};

/// Repository for the sale history.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
    feed: ChangeFeed,
}

impl TransactionRepository {
    pub fn new(pool: SqlitePool, feed: ChangeFeed) -> Self {
        TransactionRepository { pool, feed }
    }

    /// Inserts a transaction row; the store assigns id and timestamp and
    /// returns the full row.
    pub async fn insert_transaction(&self, new: &NewTransaction) -> DbResult<Transaction> {
        debug!(total = new.total_amount, customer = %new.customer_name, "Inserting transaction");

        let now = Utc::now();
        let tx = sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions (
                total_amount, customer_name, order_type,
                amount_paid, change_amount, payment_method, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            RETURNING id, total_amount, customer_name, order_type,
                      amount_paid, change_amount, payment_method, created_at
            "#,
        )
        .bind(new.total_amount)
        .bind(&new.customer_name)
        .bind(new.order_type)
        .bind(new.amount_paid)
        .bind(new.change_amount)
        .bind(new.payment_method)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        self.feed
            .publish(ChangeTable::Transactions, ChangeKind::Insert);
        Ok(tx)
    }

    /// Inserts all line items for a transaction, atomically: either the
    /// whole batch lands or none of it does.
    pub async fn insert_items(
        &self,
        transaction_id: i64,
        items: &[NewTransactionItem],
    ) -> DbResult<()> {
        debug!(transaction_id, count = items.len(), "Inserting transaction items");

        let mut db_tx = self.pool.begin().await?;
        for item in items {
            sqlx::query(
                r#"
                INSERT INTO transaction_items (
                    transaction_id, product_id, product_name, quantity, price
                ) VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )
            .bind(transaction_id)
            .bind(item.product_id)
            .bind(&item.product_name)
            .bind(item.quantity)
            .bind(item.price)
            .execute(&mut *db_tx)
            .await?;
        }
        db_tx.commit().await?;

        self.feed
            .publish(ChangeTable::Transactions, ChangeKind::Insert);
        Ok(())
    }

    /// Full sale history, newest first.
    pub async fn list(&self) -> DbResult<Vec<Transaction>> {
        let txs = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT id, total_amount, customer_name, order_type,
                   amount_paid, change_amount, payment_method, created_at
            FROM transactions
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(txs)
    }

    /// Every line item ever sold, in insertion order (the order the
    /// analytics tie-break is defined over).
    pub async fn list_items(&self) -> DbResult<Vec<TransactionItem>> {
        let items = sqlx::query_as::<_, TransactionItem>(
            r#"
            SELECT id, transaction_id, product_id, product_name, quantity, price
            FROM transaction_items
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Line items of one transaction.
    pub async fn items_for(&self, transaction_id: i64) -> DbResult<Vec<TransactionItem>> {
        let items = sqlx::query_as::<_, TransactionItem>(
            r#"
            SELECT id, transaction_id, product_id, product_name, quantity, price
            FROM transaction_items
            WHERE transaction_id = ?1
            ORDER BY id
            "#,
        )
        .bind(transaction_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Transactions that have no line items: the signature of a partial
    /// commit (step 1 landed, step 2 did not). These require manual
    /// reconciliation; they are never repaired automatically.
    pub async fn find_orphaned(&self) -> DbResult<Vec<Transaction>> {
        let txs = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT t.id, t.total_amount, t.customer_name, t.order_type,
                   t.amount_paid, t.change_amount, t.payment_method, t.created_at
            FROM transactions t
            LEFT JOIN transaction_items i ON i.transaction_id = t.id
            WHERE i.id IS NULL
            ORDER BY t.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(txs)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
