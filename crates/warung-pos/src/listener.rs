//! # Change Feed Listener
//!
//! Background task that consumes the store's change feed and refreshes the
//! matching [`LiveViews`] snapshot. Events are invalidation signals, not
//! data: the listener always goes back to the store for the full snapshot.
//!
//! Failure handling:
//! - a refresh error is logged and skipped; the next event (or a manual
//!   refresh) heals the view;
//! - a lagged receiver refreshes everything, since the dropped events could
//!   have touched any table;
//! - a closed feed ends the task. The application keeps working on stale
//!   views plus manual refresh.

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::ListenerError;
use crate::views::LiveViews;
use warung_db::{ChangeTable, Database};

/// Handle to the running listener task.
#[derive(Debug)]
pub struct ChangeFeedListener {
    handle: JoinHandle<()>,
}

impl ChangeFeedListener {
    /// Subscribes to the change feed and spawns the refresh loop.
    ///
    /// Fails with [`ListenerError::NotificationUnavailable`] if the feed is
    /// already closed; the caller then falls back to manual refresh.
    pub fn spawn(db: Database, views: Arc<LiveViews>) -> Result<Self, ListenerError> {
        let mut rx = db
            .subscribe()
            .map_err(ListenerError::NotificationUnavailable)?;

        let handle = tokio::spawn(async move {
            info!("Change feed listener started");
            loop {
                match rx.recv().await {
                    Ok(event) => {
                        debug!(?event, "Change event received");
                        let refreshed = match event.table {
                            ChangeTable::Products => views.refresh_catalog(&db).await,
                            ChangeTable::Transactions => views.refresh_history(&db).await,
                        };
                        if let Err(err) = refreshed {
                            warn!(error = %err, "View refresh failed; will retry on next event");
                        }
                    }
                    Err(RecvError::Lagged(missed)) => {
                        warn!(missed, "Change feed lagged; refreshing all views");
                        if let Err(err) = views.refresh_all(&db).await {
                            warn!(error = %err, "Catch-up refresh failed");
                        }
                    }
                    Err(RecvError::Closed) => {
                        info!("Change feed closed; listener stopping");
                        break;
                    }
                }
            }
        });

        Ok(ChangeFeedListener { handle })
    }

    /// Stops the listener task.
    pub fn shutdown(self) {
        self.handle.abort();
    }
}
