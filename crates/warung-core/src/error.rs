//! # Domain Error Types
//!
//! Errors raised by the pure business logic. Storage and orchestration
//! layers define their own error enums (`DbError` in warung-db,
//! `CheckoutError` in warung-pos) and wrap these where needed.

use thiserror::Error;

/// Errors from cart mutations.
///
/// All cart errors are local validation failures: they reject the action
/// before it happens and never leave the cart in a partial state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// A stock-limited product with zero remaining stock cannot be added.
    #[error("'{name}' (product {product_id}) is out of stock")]
    OutOfStock { product_id: i64, name: String },
}
