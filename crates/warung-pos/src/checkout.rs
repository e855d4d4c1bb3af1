//! # Checkout Orchestrator
//!
//! The one multi-step write in the system: turning an [`OrderDraft`] into a
//! durable sale.
//!
//! ## Sequencing
//! 1. Validate the draft. Any rejection here happens before the first store
//!    call, so a failed validation has zero side effects.
//! 2. Insert the transaction row (store assigns id and timestamp).
//! 3. Insert all line items, referencing that id.
//! 4. Decrement stock per line, best-effort.
//!
//! Each step blocks on the previous one; there is no abort-in-flight. A
//! failure between 2 and 3 leaves an orphaned transaction row that
//! [`SaleStore::find_orphaned`] surfaces for manual reconciliation - the
//! orchestrator never deletes or retries it on its own.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::CheckoutError;
use crate::session::CartSession;
use crate::stock::{StockReconciler, StockWarning};
use crate::store::SaleStore;
use warung_core::cart::OrderDraft;
use warung_core::{Money, NewTransaction, NewTransactionItem, OrderType, PaymentMethod};

// =============================================================================
// Request / Response
// =============================================================================

/// Checkout details the cashier enters at submit time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub customer_name: String,
    pub order_type: OrderType,
    pub payment_method: PaymentMethod,
    /// Amount the customer handed over, minor units.
    pub amount_tendered: i64,
}

/// The durable outcome of a successful commit.
#[derive(Debug, Clone, Serialize)]
pub struct CommittedSale {
    pub transaction_id: i64,
    pub total_amount: i64,
    pub change_amount: i64,
    /// Stock decrements that failed. Non-empty means the sale stands but
    /// stock counters have drifted.
    pub stock_warnings: Vec<StockWarning>,
}

// =============================================================================
// Orchestrator
// =============================================================================

/// Drives the commit pipeline against a [`SaleStore`].
#[derive(Debug)]
pub struct Checkout<S> {
    store: Arc<S>,
    reconciler: StockReconciler<S>,
}

impl<S: SaleStore> Checkout<S> {
    pub fn new(store: Arc<S>) -> Self {
        Checkout {
            reconciler: StockReconciler::new(store.clone()),
            store,
        }
    }

    /// Commits the session's cart as a sale, clearing the cart on success.
    #[instrument(skip(self, session, request), fields(customer = %request.customer_name))]
    pub async fn commit(
        &self,
        session: &CartSession,
        request: &CheckoutRequest,
    ) -> Result<CommittedSale, CheckoutError> {
        let draft = session.draft(
            request.customer_name.clone(),
            request.order_type,
            request.payment_method,
            request.amount_tendered,
        );

        let sale = self.commit_draft(&draft).await?;
        session.clear();
        Ok(sale)
    }

    /// Commits a frozen draft. Validation precedes every store call.
    pub async fn commit_draft(&self, draft: &OrderDraft) -> Result<CommittedSale, CheckoutError> {
        validate(draft)?;

        // Step 1: the transaction row. Nothing committed yet on failure.
        let tx = self
            .store
            .insert_transaction(&NewTransaction {
                total_amount: draft.subtotal,
                customer_name: draft.customer_name.clone(),
                order_type: draft.order_type,
                amount_paid: draft.amount_tendered,
                change_amount: draft.change,
                payment_method: draft.payment_method,
            })
            .await
            .map_err(CheckoutError::Persistence)?;

        // Step 2: the item batch. A failure here leaves an orphaned
        // transaction row for manual reconciliation.
        let items: Vec<NewTransactionItem> = draft
            .lines
            .iter()
            .map(|line| NewTransactionItem {
                product_id: line.product_id,
                product_name: line.name.clone(),
                quantity: line.quantity,
                price: line.unit_price,
            })
            .collect();

        self.store
            .insert_items(tx.id, &items)
            .await
            .map_err(|source| CheckoutError::PartialCommit {
                transaction_id: tx.id,
                source,
            })?;

        // Step 3: best-effort stock decrements.
        let stock_warnings = self.reconciler.apply(&draft.lines).await;

        info!(
            transaction_id = tx.id,
            total = %Money::from_minor(tx.total_amount),
            items = items.len(),
            warnings = stock_warnings.len(),
            "Sale committed"
        );

        Ok(CommittedSale {
            transaction_id: tx.id,
            total_amount: tx.total_amount,
            change_amount: tx.change_amount,
            stock_warnings,
        })
    }
}

/// Precondition checks, in order. All run before any store call.
fn validate(draft: &OrderDraft) -> Result<(), CheckoutError> {
    if draft.lines.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    if draft.customer_name.trim().is_empty() {
        return Err(CheckoutError::MissingCustomer);
    }
    if draft.payment_method.requires_tender_check() && draft.amount_tendered < draft.subtotal {
        return Err(CheckoutError::InsufficientPayment {
            required: draft.subtotal,
            tendered: draft.amount_tendered,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use warung_core::cart::Cart;
    use warung_core::Product;

    fn product(id: i64, price: i64, stock: i64) -> Product {
        Product {
            id,
            name: format!("Product {}", id),
            category: "makanan".to_string(),
            price,
            stock,
            image_url: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    fn draft_with_lines(customer: &str, method: PaymentMethod, tendered: i64) -> OrderDraft {
        let mut cart = Cart::new();
        cart.add(&product(1, 10000, 5)).unwrap();
        cart.draft(customer, OrderType::DineIn, method, tendered)
    }

    #[test]
    fn test_validate_empty_cart() {
        let draft = Cart::new().draft("Budi", OrderType::DineIn, PaymentMethod::Cash, 0);
        assert!(matches!(validate(&draft), Err(CheckoutError::EmptyCart)));
    }

    #[test]
    fn test_validate_blank_customer() {
        let draft = draft_with_lines("   ", PaymentMethod::Cash, 50000);
        assert!(matches!(
            validate(&draft),
            Err(CheckoutError::MissingCustomer)
        ));
    }

    #[test]
    fn test_validate_short_cash_tender() {
        let draft = draft_with_lines("Budi", PaymentMethod::Cash, 5000);
        assert!(matches!(
            validate(&draft),
            Err(CheckoutError::InsufficientPayment {
                required: 10000,
                tendered: 5000
            })
        ));
    }

    #[test]
    fn test_validate_non_cash_skips_tender_check() {
        // QRIS settles exactly; zero tender is legitimate
        let draft = draft_with_lines("Budi", PaymentMethod::Qris, 0);
        assert!(validate(&draft).is_ok());
    }

    #[test]
    fn test_validate_exact_cash_passes() {
        let draft = draft_with_lines("Budi", PaymentMethod::Cash, 10000);
        assert!(validate(&draft).is_ok());
    }
}
