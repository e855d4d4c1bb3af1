//! # Orchestration Error Types
//!
//! The error surface of `commit` distinguishes three situations a caller
//! must treat differently:
//!
//! - validation failures (`EmptyCart`, `MissingCustomer`,
//!   `InsufficientPayment`): rejected before any store call, zero side
//!   effects, fully recoverable by fixing the input;
//! - [`CheckoutError::Persistence`]: step 1 failed, nothing was committed,
//!   safe to retry;
//! - [`CheckoutError::PartialCommit`]: step 1 landed but step 2 did not.
//!   NOT locally recoverable - a transaction row now exists without items
//!   and a human must reconcile it (see `find_orphaned` on the store).

use thiserror::Error;
use warung_db::DbError;

/// Errors from [`crate::Checkout::commit`].
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Customer name is blank.
    #[error("Customer name is required")]
    MissingCustomer,

    /// Cash tendered is below the subtotal.
    #[error("Insufficient cash: total {required}, tendered {tendered}")]
    InsufficientPayment { required: i64, tendered: i64 },

    /// Step 1 (transaction insert) failed. Nothing was committed.
    #[error("Sale could not be persisted")]
    Persistence(#[source] DbError),

    /// Step 2 (item insert) failed after step 1 succeeded. The transaction
    /// row exists without line items and requires manual reconciliation.
    #[error("Partial commit: transaction {transaction_id} has no line items")]
    PartialCommit {
        transaction_id: i64,
        #[source]
        source: DbError,
    },
}

/// Errors from establishing the change feed subscription.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// The subscription could not be opened. Non-fatal: the application
    /// degrades to manual or periodic refresh.
    #[error("Change notifications unavailable")]
    NotificationUnavailable(#[source] DbError),
}
