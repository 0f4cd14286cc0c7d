//! Table change notifications
//!
//! Every repository mutation publishes the table it touched on a broadcast
//! channel. Front ends subscribe and re-render instead of polling; a
//! [`LiveQuery`] re-runs its query when one of the tables it reads from
//! changed.

use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::debug;

use crate::error::OffertoryResult;

/// Buffered notifications per subscriber before it starts lagging
const CHANGE_FEED_CAPACITY: usize = 256;

/// Tables of the relational store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Users,
    Donors,
    Aliases,
    Funds,
    Batches,
    Donations,
    CheckImages,
    BankSettings,
}

impl Table {
    /// SQL table name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Donors => "donors",
            Self::Aliases => "aliases",
            Self::Funds => "funds",
            Self::Batches => "batches",
            Self::Donations => "donations",
            Self::CheckImages => "check_images",
            Self::BankSettings => "bank_settings",
        }
    }

    /// All tables, parents before children
    pub fn all() -> [Self; 8] {
        [
            Self::Users,
            Self::Donors,
            Self::Aliases,
            Self::Funds,
            Self::Batches,
            Self::Donations,
            Self::CheckImages,
            Self::BankSettings,
        ]
    }
}

/// A write happened on `table`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableChange {
    pub table: Table,
}

/// Publisher side of the change notifications
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    sender: broadcast::Sender<TableChange>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Self { sender }
    }

    /// Publish a change; having no subscribers is not an error
    pub fn publish(&self, table: Table) {
        if self.sender.send(TableChange { table }).is_err() {
            debug!(table = table.name(), "change published with no subscribers");
        }
    }

    /// Receive every change published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<TableChange> {
        self.sender.subscribe()
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

type QueryFn<T> = Box<dyn Fn() -> OffertoryResult<T> + Send>;

/// A query result kept current with the tables it depends on
pub struct LiveQuery<T> {
    receiver: broadcast::Receiver<TableChange>,
    tables: Vec<Table>,
    query: QueryFn<T>,
    current: T,
}

impl<T> LiveQuery<T> {
    /// Subscribe to `feed` and run the query once
    pub fn new<F>(feed: &ChangeFeed, tables: &[Table], query: F) -> OffertoryResult<Self>
    where
        F: Fn() -> OffertoryResult<T> + Send + 'static,
    {
        // Subscribe before the first run so no change slips in between
        let receiver = feed.subscribe();
        let current = query()?;
        Ok(Self {
            receiver,
            tables: tables.to_vec(),
            query: Box::new(query),
            current,
        })
    }

    /// The latest emitted value
    pub fn current(&self) -> &T {
        &self.current
    }

    /// Drain pending notifications and re-run the query if a watched table
    /// changed. Returns whether a new value was emitted.
    pub fn refresh(&mut self) -> OffertoryResult<bool> {
        let mut stale = false;
        loop {
            match self.receiver.try_recv() {
                Ok(change) => {
                    if self.tables.contains(&change.table) {
                        stale = true;
                    }
                }
                // Missed notifications may have touched our tables
                Err(TryRecvError::Lagged(_)) => stale = true,
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }

        if stale {
            self.current = (self.query)()?;
        }
        Ok(stale)
    }

    /// Consume the query and return the latest value
    pub fn into_current(self) -> T {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_subscriber_receives_changes() {
        let feed = ChangeFeed::new();
        let mut rx = feed.subscribe();
        feed.publish(Table::Donors);
        assert_eq!(rx.try_recv().unwrap().table, Table::Donors);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_publish_without_subscribers() {
        let feed = ChangeFeed::new();
        feed.publish(Table::Funds);
    }

    #[test]
    fn test_live_query_reruns_only_for_watched_tables() {
        let feed = ChangeFeed::new();
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);

        let mut live = LiveQuery::new(&feed, &[Table::Donations], move || {
            Ok(counter.fetch_add(1, Ordering::SeqCst) + 1)
        })
        .unwrap();
        assert_eq!(*live.current(), 1);

        feed.publish(Table::Users);
        assert!(!live.refresh().unwrap());
        assert_eq!(*live.current(), 1);

        feed.publish(Table::Donations);
        feed.publish(Table::Donations);
        assert!(live.refresh().unwrap());
        assert_eq!(*live.current(), 2);
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }
}
