//! # Change Feed
//!
//! Payload-less per-table change notifications over a tokio broadcast
//! channel.
//!
//! ## Contract
//! An event means only "something in this table changed". Consumers must
//! re-read full snapshots rather than apply deltas, which makes duplicate,
//! reordered, or dropped (lagged) events harmless. Publishing never blocks
//! and never fails the write that triggered it: a sale must commit whether
//! or not anyone is watching.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::trace;

use crate::error::{DbError, DbResult};

/// Buffered events per subscriber before the oldest are dropped.
/// A lagged subscriber just re-reads once more, so a small buffer is fine.
const FEED_CAPACITY: usize = 64;

/// Which logical table changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeTable {
    Products,
    Transactions,
}

/// What kind of write happened. No row identity is carried on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// A single change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub table: ChangeTable,
    pub kind: ChangeKind,
}

/// Broadcast fan-out for change events. Cheap to clone; all clones share the
/// same channel.
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<ChangeEvent>,
    closed: Arc<AtomicBool>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(FEED_CAPACITY);
        ChangeFeed {
            tx,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Publishes an event to whoever is listening.
    ///
    /// A send error only means there are no subscribers right now; the
    /// write this event describes has already committed either way.
    pub fn publish(&self, table: ChangeTable, kind: ChangeKind) {
        if self.closed.load(Ordering::Acquire) {
            return;
        }
        let event = ChangeEvent { table, kind };
        trace!(?event, "Publishing change event");
        let _ = self.tx.send(event);
    }

    /// Opens a new subscription.
    ///
    /// Fails with [`DbError::FeedClosed`] once the feed is shut down;
    /// callers degrade to manual refresh, they do not crash.
    pub fn subscribe(&self) -> DbResult<broadcast::Receiver<ChangeEvent>> {
        if self.closed.load(Ordering::Acquire) {
            return Err(DbError::FeedClosed);
        }
        Ok(self.tx.subscribe())
    }

    /// Shuts the feed down. Existing subscribers see no further events;
    /// new subscriptions fail.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_and_receive() {
        let feed = ChangeFeed::new();
        let mut rx = feed.subscribe().unwrap();

        feed.publish(ChangeTable::Products, ChangeKind::Insert);
        feed.publish(ChangeTable::Transactions, ChangeKind::Insert);

        assert_eq!(
            rx.recv().await.unwrap(),
            ChangeEvent {
                table: ChangeTable::Products,
                kind: ChangeKind::Insert
            }
        );
        assert_eq!(rx.recv().await.unwrap().table, ChangeTable::Transactions);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_fine() {
        let feed = ChangeFeed::new();
        feed.publish(ChangeTable::Products, ChangeKind::Delete);
    }

    #[tokio::test]
    async fn test_subscribe_after_close_fails() {
        let feed = ChangeFeed::new();
        feed.close();

        assert!(matches!(feed.subscribe(), Err(DbError::FeedClosed)));
        // Publishing after close is a silent no-op
        feed.publish(ChangeTable::Products, ChangeKind::Update);
    }
}
