//! # Domain Types
//!
//! Core domain types used throughout Warung POS.
//!
//! ## Lifecycle Summary
//! - [`Product`] is long-lived and mutable (inventory edits, stock
//!   decrements). Hard deletion is allowed; historical line items keep their
//!   own snapshots so history survives.
//! - [`Transaction`] and [`TransactionItem`] are created exactly once as a
//!   pair during checkout and are append-only afterwards (no update, no
//!   delete) for audit integrity.
//!
//! ## Store-Assigned Identity
//! Every persisted row carries an `id: i64` assigned by the store on insert.
//! The `New*` payload types model "everything except what the store
//! assigns" - an insert takes a payload and returns the full row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::UNLIMITED_STOCK;

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Stable integer key, assigned by the store on insert.
    pub id: i64,

    /// Display name shown on the sales floor and snapshotted into history.
    pub name: String,

    /// Free-text category tag ("makanan", "minuman", ...).
    pub category: String,

    /// Unit price in the smallest currency unit. Non-negative.
    pub price: i64,

    /// Current stock. [`UNLIMITED_STOCK`] (-1) marks a service item that
    /// never depletes; otherwise non-negative.
    pub stock: i64,

    /// Optional image reference (a URL or storage key; this crate never
    /// touches the bytes).
    pub image_url: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Whether this product uses the unlimited-stock sentinel.
    #[inline]
    pub fn is_unlimited(&self) -> bool {
        self.stock == UNLIMITED_STOCK
    }

    /// Whether the product can currently be added to a cart.
    #[inline]
    pub fn in_stock(&self) -> bool {
        self.is_unlimited() || self.stock > 0
    }

    /// Returns the unit price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_minor(self.price)
    }
}

/// Insert payload for a product; the store assigns id and timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub category: String,
    pub price: i64,
    pub stock: i64,
    pub image_url: Option<String>,
}

// =============================================================================
// Order Type
// =============================================================================

/// How the order is fulfilled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    DineIn,
    TakeAway,
}

// =============================================================================
// Payment Method
// =============================================================================

/// How the customer paid.
///
/// Only `Cash` carries a tendered-versus-total obligation; the electronic
/// methods settle exactly and their tendered amount equals the total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash payment.
    Cash,
    /// QRIS standard QR payment.
    Qris,
    /// Bank transfer.
    Transfer,
    /// GoPay wallet.
    Gopay,
    /// OVO wallet.
    Ovo,
    /// Anything else (voucher, tab, ...).
    Other,
}

impl PaymentMethod {
    /// Whether this method requires tendered >= total at checkout.
    #[inline]
    pub fn requires_tender_check(&self) -> bool {
        matches!(self, PaymentMethod::Cash)
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// A committed sale. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Transaction {
    /// Assigned by the store on insert.
    pub id: i64,

    /// Sum of line totals at commit time.
    pub total_amount: i64,

    pub customer_name: String,
    pub order_type: OrderType,

    /// Amount the customer handed over.
    pub amount_paid: i64,

    /// `max(0, amount_paid - total_amount)` at commit time.
    pub change_amount: i64,

    pub payment_method: PaymentMethod,

    /// Assigned by the store on insert; monotonically non-decreasing.
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a transaction; the store assigns id and timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTransaction {
    pub total_amount: i64,
    pub customer_name: String,
    pub order_type: OrderType,
    pub amount_paid: i64,
    pub change_amount: i64,
    pub payment_method: PaymentMethod,
}

// =============================================================================
// Transaction Item
// =============================================================================

/// A line item in a committed sale.
///
/// `product_name` and `price` are snapshots frozen at commit time, so a
/// later rename, price change or deletion of the product never rewrites
/// what was actually sold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TransactionItem {
    pub id: i64,

    /// Back-reference to the owning transaction (the transaction owns its
    /// items, not the other way around).
    pub transaction_id: i64,

    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,

    /// Unit price snapshot at commit time.
    pub price: i64,
}

impl TransactionItem {
    /// Line total (snapshot unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> i64 {
        self.price * self.quantity
    }
}

/// Insert payload for a line item; `transaction_id` is supplied separately
/// by the orchestrator once step 1 has produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTransactionItem {
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub price: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================
