//! # Repositories
//!
//! One repository per aggregate: [`product::ProductRepository`] for the
//! mutable catalog, [`transaction::TransactionRepository`] for the
//! append-only sale history. Both publish change events after every
//! successful write.

pub mod product;
pub mod transaction;
