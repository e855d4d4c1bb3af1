//! # Cart Aggregator
//!
//! The in-memory cart for one checkout session and the immutable
//! [`OrderDraft`] it produces.
//!
//! ## Invariants
//! - Lines are unique by `product_id`; adding the same product again
//!   increments its quantity.
//! - Every line quantity is >= 1.
//! - A stock-limited line never exceeds its snapshot stock ceiling; the
//!   ceiling is frozen when the product is first added, so a concurrent
//!   restock is not seen until the product is re-added.
//! - The cart is never persisted. It lives exactly as long as one checkout
//!   session and is cleared on commit or cancel.
//!
//! Single-writer by design: concurrency is handled one level up by the
//! session handle, not here.

use serde::{Deserialize, Serialize};

use crate::error::CartError;
use crate::types::{OrderType, PaymentMethod, Product};
use crate::UNLIMITED_STOCK;

// =============================================================================
// Cart Line
// =============================================================================

/// One product entry in the cart.
///
/// Name, unit price and stock ceiling are frozen copies taken when the
/// product was added, so the cart keeps displaying consistent data even if
/// the catalog row changes underneath it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: i64,

    /// Product name at add time (frozen).
    pub name: String,

    /// Unit price at add time (frozen).
    pub unit_price: i64,

    /// Stock at add time (frozen); [`UNLIMITED_STOCK`] for service items.
    pub stock_ceiling: i64,

    /// Quantity, always >= 1.
    pub quantity: i64,
}

impl CartLine {
    fn from_product(product: &Product) -> Self {
        CartLine {
            product_id: product.id,
            name: product.name.clone(),
            unit_price: product.price,
            stock_ceiling: product.stock,
            quantity: 1,
        }
    }

    /// Line total (frozen unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> i64 {
        self.unit_price * self.quantity
    }

    /// Whether the snapshot marks this line as never-depleting.
    #[inline]
    pub fn is_unlimited(&self) -> bool {
        self.stock_ceiling == UNLIMITED_STOCK
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The in-progress, unpersisted set of selected product lines for one sale.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { lines: Vec::new() }
    }

    /// Adds one unit of a product.
    ///
    /// Fails with [`CartError::OutOfStock`] if the product is stock-limited
    /// with nothing left; the cart is untouched in that case. If the product
    /// is already in the cart its quantity grows by one, silently capped at
    /// the snapshot ceiling for stock-limited lines.
    pub fn add(&mut self, product: &Product) -> Result<(), CartError> {
        if !product.in_stock() {
            return Err(CartError::OutOfStock {
                product_id: product.id,
                name: product.name.clone(),
            });
        }

        if let Some(line) = self.line_mut(product.id) {
            if line.is_unlimited() || line.quantity < line.stock_ceiling {
                line.quantity += 1;
            }
            return Ok(());
        }

        self.lines.push(CartLine::from_product(product));
        Ok(())
    }

    /// Adjusts a line's quantity by `delta`.
    ///
    /// The new quantity is `max(1, current + delta)` - a line can never drop
    /// below one (use [`Cart::remove`] to drop it entirely). An increase that
    /// would push a stock-limited line past its snapshot ceiling is silently
    /// rejected and the quantity stays at its current value.
    ///
    /// Unknown product ids are a no-op.
    pub fn set_quantity(&mut self, product_id: i64, delta: i64) {
        if let Some(line) = self.line_mut(product_id) {
            if delta > 0 && !line.is_unlimited() && line.quantity + delta > line.stock_ceiling {
                return;
            }
            line.quantity = (line.quantity + delta).max(1);
        }
    }

    /// Removes a line; no-op if the product is not in the cart.
    pub fn remove(&mut self, product_id: i64) {
        self.lines.retain(|l| l.product_id != product_id);
    }

    /// Σ(unit price × quantity) over all lines. Pure, side-effect free.
    pub fn total(&self) -> i64 {
        self.lines.iter().map(|l| l.line_total()).sum()
    }

    /// Empties the cart. Called only after a successful commit or an
    /// explicit cancel.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Produces the immutable checkout snapshot.
    ///
    /// The draft copies the lines and computes subtotal and change once;
    /// nothing mutates it after submission begins.
    pub fn draft(
        &self,
        customer_name: impl Into<String>,
        order_type: OrderType,
        payment_method: PaymentMethod,
        amount_tendered: i64,
    ) -> OrderDraft {
        let subtotal = self.total();
        OrderDraft {
            lines: self.lines.clone(),
            subtotal,
            customer_name: customer_name.into(),
            order_type,
            payment_method,
            amount_tendered,
            change: (amount_tendered - subtotal).max(0),
        }
    }

    fn line_mut(&mut self, product_id: i64) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|l| l.product_id == product_id)
    }
}

// =============================================================================
// Order Draft
// =============================================================================

/// Read-only view of a cart at checkout time.
///
/// Constructed fresh by [`Cart::draft`] when the cashier submits; the
/// orchestrator validates and persists it without ever mutating it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDraft {
    /// Ordered line items, frozen.
    pub lines: Vec<CartLine>,

    /// Σ(unit price × quantity) at draft time.
    pub subtotal: i64,

    pub customer_name: String,
    pub order_type: OrderType,
    pub payment_method: PaymentMethod,

    /// Amount the customer handed over.
    pub amount_tendered: i64,

    /// `max(0, amount_tendered - subtotal)`.
    pub change: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(id: i64, price: i64, stock: i64) -> Product {
        Product {
            id,
            name: format!("Product {}", id),
            category: "makanan".to_string(),
            price,
            stock,
            image_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_add_new_line() {
        let mut cart = Cart::new();
        cart.add(&product(1, 10000, 5)).unwrap();

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.lines()[0].quantity, 1);
        assert_eq!(cart.total(), 10000);
    }

    #[test]
    fn test_add_same_product_increments() {
        let mut cart = Cart::new();
        let p = product(1, 10000, 5);
        cart.add(&p).unwrap();
        cart.add(&p).unwrap();

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.lines()[0].quantity, 2);
        assert_eq!(cart.total(), 20000);
    }

    #[test]
    fn test_add_out_of_stock_rejected_without_mutation() {
        let mut cart = Cart::new();
        let err = cart.add(&product(1, 10000, 0)).unwrap_err();

        assert!(matches!(err, CartError::OutOfStock { product_id: 1, .. }));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_caps_at_snapshot_ceiling() {
        let mut cart = Cart::new();
        let p = product(1, 10000, 2);
        cart.add(&p).unwrap();
        cart.add(&p).unwrap();
        // Third add is silently capped at the ceiling of 2
        cart.add(&p).unwrap();

        assert_eq!(cart.lines()[0].quantity, 2);
    }

    #[test]
    fn test_add_unlimited_never_capped() {
        let mut cart = Cart::new();
        let p = product(1, 10000, crate::UNLIMITED_STOCK);
        for _ in 0..10 {
            cart.add(&p).unwrap();
        }
        assert_eq!(cart.lines()[0].quantity, 10);
    }

    #[test]
    fn test_set_quantity_floors_at_one() {
        let mut cart = Cart::new();
        cart.add(&product(1, 10000, 5)).unwrap();
        cart.set_quantity(1, -10);

        assert_eq!(cart.lines()[0].quantity, 1);
    }

    #[test]
    fn test_set_quantity_rejects_increase_past_ceiling() {
        let mut cart = Cart::new();
        cart.add(&product(1, 10000, 3)).unwrap();
        cart.set_quantity(1, 2); // 3, at ceiling
        cart.set_quantity(1, 1); // would be 4 > 3: rejected, stays 3

        assert_eq!(cart.lines()[0].quantity, 3);
    }

    #[test]
    fn test_set_quantity_unknown_product_is_noop() {
        let mut cart = Cart::new();
        cart.add(&product(1, 10000, 5)).unwrap();
        cart.set_quantity(99, 1);

        assert_eq!(cart.total(), 10000);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut cart = Cart::new();
        cart.add(&product(1, 10000, 5)).unwrap();
        cart.add(&product(2, 5000, 5)).unwrap();

        cart.remove(1);
        assert_eq!(cart.len(), 1);
        cart.remove(99); // no-op
        assert_eq!(cart.len(), 1);

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), 0);
    }

    #[test]
    fn test_total_tracks_mutation_sequences() {
        let mut cart = Cart::new();
        let a = product(1, 10000, 10);
        let b = product(2, 5000, crate::UNLIMITED_STOCK);

        cart.add(&a).unwrap();
        cart.add(&b).unwrap();
        cart.set_quantity(1, 3); // a: 4
        cart.set_quantity(2, 1); // b: 2
        assert_eq!(cart.total(), 4 * 10000 + 2 * 5000);

        cart.set_quantity(1, -2); // a: 2
        cart.remove(2);
        assert_eq!(cart.total(), 2 * 10000);
    }

    #[test]
    fn test_draft_totals_and_change() {
        let mut cart = Cart::new();
        let a = product(1, 10000, 10);
        cart.add(&a).unwrap();
        cart.add(&a).unwrap();
        cart.add(&product(2, 5000, 10)).unwrap();

        let draft = cart.draft("Budi", OrderType::DineIn, PaymentMethod::Cash, 30000);
        assert_eq!(draft.subtotal, 25000);
        assert_eq!(draft.change, 5000);
        assert_eq!(draft.lines.len(), 2);

        // Short tender clamps change at zero; validation happens later
        let short = cart.draft("Budi", OrderType::DineIn, PaymentMethod::Cash, 20000);
        assert_eq!(short.change, 0);
    }
}
