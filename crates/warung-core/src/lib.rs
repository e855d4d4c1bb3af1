//! # warung-core: Pure Business Logic for Warung POS
//!
//! This crate contains the business rules of the point of sale as pure
//! functions with zero I/O dependencies. The storage layer (`warung-db`)
//! and the orchestration layer (`warung-pos`) sit on top of it.
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Transaction, TransactionItem, enums)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - The cart aggregator and the immutable [`cart::OrderDraft`]
//! - [`analytics`] - Daily sales series and top-product rankings
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure functions**: same input, same output - no hidden state
//! 2. **No I/O**: database, network and file access are forbidden here
//! 3. **Integer money**: all amounts are i64 in the smallest currency unit
//! 4. **Explicit errors**: typed enums, never strings or panics

pub mod analytics;
pub mod cart;
pub mod error;
pub mod money;
pub mod types;

pub use cart::{Cart, CartLine, OrderDraft};
pub use error::CartError;
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Sentinel stock value for products that never deplete (service items such
/// as dine-in surcharges or made-to-order dishes).
///
/// A product with `stock == UNLIMITED_STOCK` is never rejected by the cart
/// and is skipped entirely by stock reconciliation.
pub const UNLIMITED_STOCK: i64 = -1;
