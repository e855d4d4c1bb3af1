//! # Product Repository
//!
//! Catalog CRUD and the stock decrement used by checkout.
//!
//! ## Stock Update Strategy
//! Stock is decremented server-side and relatively:
//!
//! ```sql
//! UPDATE products SET stock = MAX(stock - ?, 0) WHERE id = ? AND stock <> -1
//! ```
//!
//! never by writing an absolute value computed from a snapshot. Two
//! terminals selling the same product serialize on the row instead of
//! clobbering each other (10 - 1 - 1 = 8, never 9). Unlimited products
//! (stock = -1) are excluded by the predicate so the sentinel can never be
//! consumed. The decrement clamps at zero: the sale is the authoritative
//! record, stock is a derived counter reconciled by inventory audits.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::feed::{ChangeFeed, ChangeKind, ChangeTable};
use warung_core::{NewProduct, Product};

/// Repository for catalog operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
    feed: ChangeFeed,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool, feed: ChangeFeed) -> Self {
        ProductRepository { pool, feed }
    }

    /// Full catalog, ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, category, price, stock, image_url, created_at, updated_at
            FROM products
            ORDER BY name, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, category, price, stock, image_url, created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Inserts a product; the store assigns id and timestamps and returns
    /// the full row.
    pub async fn insert(&self, new: &NewProduct) -> DbResult<Product> {
        debug!(name = %new.name, "Inserting product");

        let now = Utc::now();
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (name, category, price, stock, image_url, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            RETURNING id, name, category, price, stock, image_url, created_at, updated_at
            "#,
        )
        .bind(&new.name)
        .bind(&new.category)
        .bind(new.price)
        .bind(new.stock)
        .bind(&new.image_url)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        self.feed.publish(ChangeTable::Products, ChangeKind::Insert);
        Ok(product)
    }

    /// Updates name, category, price, stock and image of an existing product.
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = product.id, "Updating product");

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                category = ?3,
                price = ?4,
                stock = ?5,
                image_url = ?6,
                updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.price)
        .bind(product.stock)
        .bind(&product.image_url)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", product.id));
        }

        self.feed.publish(ChangeTable::Products, ChangeKind::Update);
        Ok(())
    }

    /// Hard-deletes a product.
    ///
    /// Historical transaction items keep their own name/price snapshots, so
    /// history stays displayable; only the live catalog loses the row.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        self.feed.publish(ChangeTable::Products, ChangeKind::Delete);
        Ok(())
    }

    /// Applies one relative stock decrement for a sold line.
    ///
    /// Unlimited products (stock = -1) never match the predicate and report
    /// [`DbError::NotFound`]; callers skip them beforehand using the cart
    /// snapshot. The subtraction happens inside the store, so concurrent
    /// decrements serialize (no lost updates), and the result clamps at
    /// zero to keep the unlimited sentinel unreachable by depletion.
    pub async fn decrement_stock(&self, id: i64, quantity: i64) -> DbResult<()> {
        debug!(id, quantity, "Decrementing stock");

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock = MAX(stock - ?2, 0), updated_at = ?3
            WHERE id = ?1 AND stock <> -1
            "#,
        )
        .bind(id)
        .bind(quantity)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Stock-limited product", id));
        }

        self.feed.publish(ChangeTable::Products, ChangeKind::Update);
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
