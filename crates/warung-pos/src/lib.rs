//! # warung-pos: Checkout Orchestration for Warung POS
//!
//! The layer between the pure business core and the storage layer. The one
//! flow with real invariants lives here: turning an in-memory cart into a
//! durable sale.
//!
//! ## The Checkout Pipeline
//! ```text
//! CartSession ──draft──► Checkout::commit
//!                          │ 1. insert transaction row   (fail: Persistence)
//!                          │ 2. insert item rows          (fail: PartialCommit)
//!                          │ 3. stock decrements          (fail: warnings only)
//!                          ▼
//!                        change feed ──► ChangeFeedListener ──► LiveViews
//! ```
//!
//! Steps commit independently with a blocking await between each; there is
//! no abort-in-flight once step 1 has been issued. Step 3 is best-effort by
//! design: the sale is the authoritative event, stock a derived counter.
//!
//! ## Modules
//! - [`session`] - explicit per-terminal cart handle (no global state)
//! - [`checkout`] - the orchestrator and its preconditions
//! - [`stock`] - best-effort stock reconciliation
//! - [`listener`] - change feed consumption, snapshot re-reads
//! - [`views`] - catalog / history / analytics snapshots
//! - [`store`] - the `SaleStore` seam the orchestrator writes through
//! - [`error`] - `CheckoutError` and `ListenerError`

pub mod checkout;
pub mod error;
pub mod listener;
pub mod session;
pub mod stock;
pub mod store;
pub mod views;

pub use checkout::{Checkout, CheckoutRequest, CommittedSale};
pub use error::{CheckoutError, ListenerError};
pub use listener::ChangeFeedListener;
pub use session::CartSession;
pub use stock::{StockReconciler, StockWarning};
pub use store::SaleStore;
pub use views::LiveViews;
