//! # Analytics Aggregator
//!
//! Derived sales views, recomputed from the full raw history every time.
//!
//! No incremental state is kept: transaction volume at a single counter is
//! low enough that a full recomputation costs microseconds, and a pure
//! function of history can never drift out of sync with it. Both projections
//! are idempotent and safe to run while checkouts are in flight - the result
//! is just a snapshot that may be a moment stale or a moment ahead.

use std::collections::{BTreeMap, HashMap};

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::types::{Transaction, TransactionItem};

/// How many most-recent dates the daily series keeps.
pub const DAILY_SERIES_DAYS: usize = 30;

/// How many entries the top-products ranking keeps.
pub const TOP_PRODUCTS_LIMIT: usize = 10;

// =============================================================================
// Daily Sales Series
// =============================================================================

/// Total sales for one local calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySales {
    pub date: NaiveDate,
    pub total_amount: i64,
}

/// Groups all transactions by the local calendar date of their timestamp,
/// sums `total_amount` per date, and returns the series ascending by date,
/// trimmed to the most recent [`DAILY_SERIES_DAYS`] dates.
///
/// Dates with no sales simply do not appear; the chart layer decides how to
/// render gaps.
pub fn daily_sales(transactions: &[Transaction]) -> Vec<DailySales> {
    let mut by_date: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for tx in transactions {
        let date = tx.created_at.with_timezone(&Local).date_naive();
        *by_date.entry(date).or_insert(0) += tx.total_amount;
    }

    let mut series: Vec<DailySales> = by_date
        .into_iter()
        .map(|(date, total_amount)| DailySales { date, total_amount })
        .collect();

    if series.len() > DAILY_SERIES_DAYS {
        let cut = series.len() - DAILY_SERIES_DAYS;
        series.drain(..cut);
    }
    series
}

// =============================================================================
// Top Products
// =============================================================================

/// Summed quantity sold for one product name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopProduct {
    pub product_name: String,
    pub total_quantity: i64,
}

/// Ranks products by total quantity sold across all line items, descending,
/// trimmed to [`TOP_PRODUCTS_LIMIT`].
///
/// Grouping is by snapshot name rather than product id, deliberately: a
/// product that was renamed or deleted-and-recreated under the same display
/// name merges into one row.
///
/// Tie-break: when two sums are equal, the product that reached its final
/// total first in the history ranks first (i.e. the one whose last
/// contributing line item appears earlier). Deterministic for a given
/// history ordering.
pub fn top_products(items: &[TransactionItem]) -> Vec<TopProduct> {
    // (running total, position of the last contributing item)
    let mut ranking: Vec<(TopProduct, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (pos, item) in items.iter().enumerate() {
        match index.get(&item.product_name) {
            Some(&i) => {
                ranking[i].0.total_quantity += item.quantity;
                ranking[i].1 = pos;
            }
            None => {
                index.insert(item.product_name.clone(), ranking.len());
                ranking.push((
                    TopProduct {
                        product_name: item.product_name.clone(),
                        total_quantity: item.quantity,
                    },
                    pos,
                ));
            }
        }
    }

    ranking.sort_by(|a, b| {
        b.0.total_quantity
            .cmp(&a.0.total_quantity)
            .then(a.1.cmp(&b.1))
    });
    ranking.truncate(TOP_PRODUCTS_LIMIT);
    ranking.into_iter().map(|(top, _)| top).collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
