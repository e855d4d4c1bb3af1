//! # Stock Reconciliation
//!
//! Best-effort stock decrements after a committed sale. The sale record is
//! the authoritative event; the stock counter is derived, so a failed
//! decrement produces a warning, never a failed checkout.
//!
//! Decrements are relative (`stock - quantity`, clamped at zero) and
//! applied server-side, so two terminals selling the same product
//! concurrently both land their decrement instead of one overwriting the
//! other with a stale absolute value. Unlimited-stock lines are skipped
//! entirely.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::store::SaleStore;
use warung_core::cart::CartLine;

/// One stock decrement that could not be applied. The sale itself stands.
#[derive(Debug, Clone, Serialize)]
pub struct StockWarning {
    pub product_id: i64,
    pub name: String,
    pub quantity: i64,
    pub reason: String,
}

/// Applies post-commit stock decrements through the store.
#[derive(Debug)]
pub struct StockReconciler<S> {
    store: Arc<S>,
}

impl<S: SaleStore> StockReconciler<S> {
    pub fn new(store: Arc<S>) -> Self {
        StockReconciler { store }
    }

    /// Decrements stock for every stock-limited line.
    ///
    /// Failures are collected as warnings; every line is still attempted
    /// (one bad product id must not starve the rest of the order).
    pub async fn apply(&self, lines: &[CartLine]) -> Vec<StockWarning> {
        let mut warnings = Vec::new();

        for line in lines {
            if line.is_unlimited() {
                debug!(product_id = line.product_id, "Skipping unlimited-stock line");
                continue;
            }

            if let Err(err) = self
                .store
                .decrement_stock(line.product_id, line.quantity)
                .await
            {
                warn!(
                    product_id = line.product_id,
                    quantity = line.quantity,
                    error = %err,
                    "Stock decrement failed; sale stands, stock will drift"
                );
                warnings.push(StockWarning {
                    product_id: line.product_id,
                    name: line.name.clone(),
                    quantity: line.quantity,
                    reason: err.to_string(),
                });
            }
        }

        warnings
    }
}
