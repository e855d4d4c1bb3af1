//! # Cart Session
//!
//! An explicit, cloneable handle to one terminal's cart. There is no global
//! cart: every call site that wants to touch the cart goes through a
//! session value it was handed, which keeps a second terminal (or a test)
//! from ever observing another session's lines.

use std::sync::{Arc, Mutex};

use warung_core::cart::{Cart, OrderDraft};
use warung_core::{CartError, OrderType, PaymentMethod, Product};

/// Shared handle to a single cart. Cloning the session shares the same
/// underlying cart; two sessions created independently never interact.
#[derive(Debug, Clone, Default)]
pub struct CartSession {
    cart: Arc<Mutex<Cart>>,
}

impl CartSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one unit of a product to this session's cart.
    pub fn add(&self, product: &Product) -> Result<(), CartError> {
        self.with_cart_mut(|cart| cart.add(product))
    }

    /// Adjusts a line's quantity by `delta`.
    pub fn set_quantity(&self, product_id: i64, delta: i64) {
        self.with_cart_mut(|cart| cart.set_quantity(product_id, delta));
    }

    /// Removes a line.
    pub fn remove(&self, product_id: i64) {
        self.with_cart_mut(|cart| cart.remove(product_id));
    }

    /// Current running total.
    pub fn total(&self) -> i64 {
        self.with_cart(|cart| cart.total())
    }

    pub fn is_empty(&self) -> bool {
        self.with_cart(|cart| cart.is_empty())
    }

    /// Empties the cart (cancel, or post-commit cleanup).
    pub fn clear(&self) {
        self.with_cart_mut(|cart| cart.clear());
    }

    /// Freezes the current cart into an immutable checkout snapshot.
    pub fn draft(
        &self,
        customer_name: impl Into<String>,
        order_type: OrderType,
        payment_method: PaymentMethod,
        amount_tendered: i64,
    ) -> OrderDraft {
        self.with_cart(|cart| cart.draft(customer_name, order_type, payment_method, amount_tendered))
    }

    /// Runs a closure with shared access to the cart.
    pub fn with_cart<R>(&self, f: impl FnOnce(&Cart) -> R) -> R {
        let cart = self.cart.lock().expect("Cart mutex poisoned");
        f(&cart)
    }

    /// Runs a closure with exclusive access to the cart.
    pub fn with_cart_mut<R>(&self, f: impl FnOnce(&mut Cart) -> R) -> R {
        let mut cart = self.cart.lock().expect("Cart mutex poisoned");
        f(&mut cart)
    }
}
