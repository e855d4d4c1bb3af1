//! End-to-end checkout pipeline tests against an in-memory store, plus
//! mock-store tests for the failure paths the real store cannot be made to
//! exhibit on demand.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use warung_core::{
    NewProduct, NewTransaction, NewTransactionItem, OrderType, PaymentMethod, Product, Transaction,
    UNLIMITED_STOCK,
};
use warung_db::{Database, DbConfig, DbError, DbResult};
use warung_pos::{
    CartSession, ChangeFeedListener, Checkout, CheckoutError, CheckoutRequest, ListenerError,
    LiveViews, SaleStore,
};

// =============================================================================
// Helpers
// =============================================================================

/// Wires test output through tracing so `RUST_LOG=warung_pos=debug cargo
/// test` shows the pipeline's own logs. Safe to call from every test.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

async fn db() -> Database {
    init_tracing();
    Database::new(DbConfig::in_memory()).await.unwrap()
}

async fn seed_product(db: &Database, name: &str, price: i64, stock: i64) -> Product {
    db.products()
        .insert(&NewProduct {
            name: name.to_string(),
            category: "makanan".to_string(),
            price,
            stock,
            image_url: None,
        })
        .await
        .unwrap()
}

fn catalog_product(id: i64, price: i64, stock: i64) -> Product {
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

fn cash_request(customer: &str, tendered: i64) -> CheckoutRequest {
    CheckoutRequest {
        customer_name: customer.to_string(),
        order_type: OrderType::DineIn,
        payment_method: PaymentMethod::Cash,
        amount_tendered: tendered,
    }
}

// =============================================================================
// Mock store: counts calls
// =============================================================================

#[derive(Default)]
struct MockStore {
    transactions: AtomicUsize,
    item_batches: AtomicUsize,
    decrements: AtomicUsize,
    fail_items: AtomicBool,
}

#[async_trait]
impl SaleStore for MockStore {
    async fn insert_transaction(&self, new: &NewTransaction) -> DbResult<Transaction> {
        self.transactions.fetch_add(1, Ordering::SeqCst);
        Ok(Transaction {
            id: 1,
            total_amount: new.total_amount,
            customer_name: new.customer_name.clone(),
            order_type: new.order_type,
            amount_paid: new.amount_paid,
            change_amount: new.change_amount,
            payment_method: new.payment_method,
            created_at: chrono::Utc::now(),
        })
    }

    async fn insert_items(
        &self,
        _transaction_id: i64,
        _items: &[NewTransactionItem],
    ) -> DbResult<()> {
        self.item_batches.fetch_add(1, Ordering::SeqCst);
        if self.fail_items.load(Ordering::SeqCst) {
            return Err(DbError::QueryFailed("disk I/O error".into()));
        }
        Ok(())
    }

    async fn decrement_stock(&self, _product_id: i64, _quantity: i64) -> DbResult<()> {
        self.decrements.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn find_orphaned(&self) -> DbResult<Vec<Transaction>> {
        Ok(Vec::new())
    }
}

/// Delegates to a real database but fails the item batch, to manufacture a
/// genuine orphaned transaction row.
struct ItemFailureStore {
    inner: Database,
}

#[async_trait]
impl SaleStore for ItemFailureStore {
    async fn insert_transaction(&self, new: &NewTransaction) -> DbResult<Transaction> {
        self.inner.transactions().insert_transaction(new).await
    }

    async fn insert_items(
        &self,
        _transaction_id: i64,
        _items: &[NewTransactionItem],
    ) -> DbResult<()> {
        Err(DbError::QueryFailed("disk I/O error".into()))
    }

    async fn decrement_stock(&self, product_id: i64, quantity: i64) -> DbResult<()> {
        self.inner
            .products()
            .decrement_stock(product_id, quantity)
            .await
    }

    async fn find_orphaned(&self) -> DbResult<Vec<Transaction>> {
        self.inner.transactions().find_orphaned().await
    }
}

// =============================================================================
// Validation happens before any store call
// =============================================================================

#[tokio::test]
async fn test_empty_cart_makes_zero_store_calls() {
    init_tracing();
    let store = Arc::new(MockStore::default());
    let checkout = Checkout::new(store.clone());
    let session = CartSession::new();

    let err = checkout
        .commit(&session, &cash_request("Budi", 10000))
        .await
        .unwrap_err();

    assert!(matches!(err, CheckoutError::EmptyCart));
    assert_eq!(store.transactions.load(Ordering::SeqCst), 0);
    assert_eq!(store.item_batches.load(Ordering::SeqCst), 0);
    assert_eq!(store.decrements.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_blank_customer_makes_zero_store_calls() {
    init_tracing();
    let store = Arc::new(MockStore::default());
    let checkout = Checkout::new(store.clone());
    let session = CartSession::new();
    session.add(&catalog_product(1, 10000, 5)).unwrap();

    let err = checkout
        .commit(&session, &cash_request("   ", 10000))
        .await
        .unwrap_err();

    assert!(matches!(err, CheckoutError::MissingCustomer));
    assert_eq!(store.transactions.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_insufficient_cash_makes_zero_store_calls() {
    init_tracing();
    let store = Arc::new(MockStore::default());
    let checkout = Checkout::new(store.clone());
    let session = CartSession::new();
    session.add(&catalog_product(1, 10000, 5)).unwrap();

    let err = checkout
        .commit(&session, &cash_request("Budi", 5000))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CheckoutError::InsufficientPayment {
            required: 10000,
            tendered: 5000
        }
    ));
    assert_eq!(store.transactions.load(Ordering::SeqCst), 0);
    // Validation failure leaves the cart intact for correction
    assert!(!session.is_empty());
}

// =============================================================================
// Full round trip against the real store
// =============================================================================

#[tokio::test]
async fn test_checkout_round_trip() {
    let db = db().await;
    let nasi = seed_product(&db, "Nasi Goreng", 10000, 10).await;
    let teh = seed_product(&db, "Es Teh", 5000, 10).await;

    let session = CartSession::new();
    session.add(&nasi).unwrap();
    session.add(&nasi).unwrap();
    session.add(&teh).unwrap();

    let checkout = Checkout::new(Arc::new(db.clone()));
    let sale = checkout
        .commit(&session, &cash_request("Budi", 30000))
        .await
        .unwrap();

    assert_eq!(sale.total_amount, 25000);
    assert_eq!(sale.change_amount, 5000);
    assert!(sale.stock_warnings.is_empty());
    assert!(session.is_empty());

    // Persisted rows match the draft
    let items = db
        .transactions()
        .items_for(sale.transaction_id)
        .await
        .unwrap();
    assert_eq!(items.len(), 2);
    let sum: i64 = items.iter().map(|i| i.line_total()).sum();
    assert_eq!(sum, 25000);

    // Stock decremented per line quantity
    let nasi_after = db.products().get_by_id(nasi.id).await.unwrap().unwrap();
    let teh_after = db.products().get_by_id(teh.id).await.unwrap().unwrap();
    assert_eq!(nasi_after.stock, 8);
    assert_eq!(teh_after.stock, 9);

    // No orphans after a clean commit
    assert!(db.transactions().find_orphaned().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unlimited_stock_skips_decrement() {
    let db = db().await;
    let dish = seed_product(&db, "Nasi Rames", 12000, UNLIMITED_STOCK).await;

    let session = CartSession::new();
    session.add(&dish).unwrap();
    session.add(&dish).unwrap();

    let checkout = Checkout::new(Arc::new(db.clone()));
    let sale = checkout
        .commit(&session, &cash_request("Siti", 24000))
        .await
        .unwrap();

    assert!(sale.stock_warnings.is_empty());
    let after = db.products().get_by_id(dish.id).await.unwrap().unwrap();
    assert_eq!(after.stock, UNLIMITED_STOCK);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_concurrent_checkouts_accumulate_decrements() {
    let db = db().await;
    let nasi = seed_product(&db, "Nasi Goreng", 10000, 10).await;
    let checkout = Arc::new(Checkout::new(Arc::new(db.clone())));

    // Two terminals sell the same product at the same time
    let commit = |checkout: Arc<Checkout<Database>>, product: Product| async move {
        let session = CartSession::new();
        session.add(&product).unwrap();
        checkout
            .commit(&session, &cash_request("Budi", 10000))
            .await
            .unwrap()
    };
    let (a, b) = tokio::join!(
        tokio::spawn(commit(checkout.clone(), nasi.clone())),
        tokio::spawn(commit(checkout.clone(), nasi.clone()))
    );
    assert_ne!(a.unwrap().transaction_id, b.unwrap().transaction_id);

    // Relative decrements: both sales land, neither overwrites the other
    let after = db.products().get_by_id(nasi.id).await.unwrap().unwrap();
    assert_eq!(after.stock, 8);
}

// =============================================================================
// Failure paths
// =============================================================================

#[tokio::test]
async fn test_partial_commit_stops_before_stock() {
    init_tracing();
    let store = Arc::new(MockStore::default());
    store.fail_items.store(true, Ordering::SeqCst);
    let checkout = Checkout::new(store.clone());

    let session = CartSession::new();
    session.add(&catalog_product(1, 10000, 5)).unwrap();

    let err = checkout
        .commit(&session, &cash_request("Budi", 10000))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CheckoutError::PartialCommit { transaction_id: 1, .. }
    ));
    assert_eq!(store.transactions.load(Ordering::SeqCst), 1);
    assert_eq!(store.item_batches.load(Ordering::SeqCst), 1);
    // The pipeline never reaches the stock step
    assert_eq!(store.decrements.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_partial_commit_leaves_detectable_orphan() {
    let db = db().await;
    let nasi = seed_product(&db, "Nasi Goreng", 10000, 10).await;

    let session = CartSession::new();
    session.add(&nasi).unwrap();

    let store = Arc::new(ItemFailureStore { inner: db.clone() });
    let checkout = Checkout::new(store);
    let err = checkout
        .commit(&session, &cash_request("Budi", 10000))
        .await
        .unwrap_err();

    let orphan_id = match err {
        CheckoutError::PartialCommit { transaction_id, .. } => transaction_id,
        other => panic!("expected PartialCommit, got {other:?}"),
    };

    // The cart survives a failed commit
    assert!(!session.is_empty());

    // Exactly the failed transaction shows up for reconciliation
    let orphans = db.transactions().find_orphaned().await.unwrap();
    assert_eq!(orphans.len(), 1);
    assert_eq!(orphans[0].id, orphan_id);

    // Stock was never touched: decrements run after the item batch
    let after = db.products().get_by_id(nasi.id).await.unwrap().unwrap();
    assert_eq!(after.stock, 10);
}

#[tokio::test]
async fn test_failed_decrement_warns_but_commits() {
    let db = db().await;
    let nasi = seed_product(&db, "Nasi Goreng", 10000, 10).await;

    let session = CartSession::new();
    session.add(&nasi).unwrap();
    // A product deleted between add and commit: decrement will miss
    db.products().delete(nasi.id).await.unwrap();

    let checkout = Checkout::new(Arc::new(db.clone()));
    let sale = checkout
        .commit(&session, &cash_request("Budi", 10000))
        .await
        .unwrap();

    assert_eq!(sale.stock_warnings.len(), 1);
    assert_eq!(sale.stock_warnings[0].product_id, nasi.id);
    // The sale itself stands
    let items = db
        .transactions()
        .items_for(sale.transaction_id)
        .await
        .unwrap();
    assert_eq!(items.len(), 1);
}

// =============================================================================
// Change feed listener and live views
// =============================================================================

#[tokio::test]
async fn test_listener_refreshes_views_on_commit() {
    let db = db().await;
    let views = Arc::new(LiveViews::new());
    let listener = ChangeFeedListener::spawn(db.clone(), views.clone()).unwrap();

    let nasi = seed_product(&db, "Nasi Goreng", 10000, 10).await;
    for _ in 0..100 {
        if !views.catalog().await.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(views.catalog().await[0].id, nasi.id);

    let session = CartSession::new();
    session.add(&nasi).unwrap();
    Checkout::new(Arc::new(db.clone()))
        .commit(&session, &cash_request("Budi", 10000))
        .await
        .unwrap();

    for _ in 0..100 {
        if !views.history().await.is_empty() && !views.top_products().await.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert_eq!(views.history().await[0].total_amount, 10000);
    assert_eq!(views.daily_sales().await.len(), 1);
    assert_eq!(views.top_products().await[0].product_name, "Nasi Goreng");

    listener.shutdown();
}

#[tokio::test]
async fn test_closed_feed_degrades_to_manual_refresh() {
    let db = db().await;
    seed_product(&db, "Nasi Goreng", 10000, 10).await;

    db.feed().close();
    let views = Arc::new(LiveViews::new());

    let err = ChangeFeedListener::spawn(db.clone(), views.clone()).unwrap_err();
    assert!(matches!(err, ListenerError::NotificationUnavailable(_)));

    // Reads and manual refresh keep working without notifications
    views.refresh_all(&db).await.unwrap();
    assert_eq!(views.catalog().await.len(), 1);
}
