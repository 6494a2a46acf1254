//! Change notification and snapshot subscriptions
//!
//! Every write publishes the tables it touched. A watcher re-runs its query
//! whenever one of the tables it depends on shows up and pushes the full
//! result to its subscriber. Each subscription owns its own task and channel;
//! dropping the [`Snapshots`] handle stops the task.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;
use tracing::debug;

use super::Database;
use crate::error::Result;

/// Buffered snapshots per subscriber before the watcher waits
const SNAPSHOT_BUFFER: usize = 16;

/// Tables a write can touch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Users,
    Accounts,
    Categories,
    Events,
    EventParticipants,
    Locations,
    Payees,
    PayeeTransactions,
    Lenders,
    Borrowers,
    Transactions,
    TransactionPayees,
    TransactionImages,
}

impl Table {
    /// This table plus every table a delete here can cascade into
    pub fn cascade(self) -> &'static [Table] {
        use Table::*;
        match self {
            Users => &[
                Users,
                Accounts,
                Events,
                EventParticipants,
                Locations,
                Payees,
                PayeeTransactions,
                Lenders,
                Borrowers,
                Transactions,
                TransactionPayees,
                TransactionImages,
            ],
            Accounts => &[
                Accounts,
                Events,
                EventParticipants,
                Locations,
                Payees,
                PayeeTransactions,
                Lenders,
                Borrowers,
                Transactions,
                TransactionPayees,
                TransactionImages,
            ],
            Categories => &[Categories, Transactions, TransactionPayees, TransactionImages],
            Events => &[Events, EventParticipants, Transactions],
            Locations => &[Locations, Transactions],
            Lenders => &[Lenders, Transactions],
            Borrowers => &[Borrowers, Transactions],
            Payees => &[Payees, TransactionPayees],
            Transactions => &[Transactions, TransactionPayees, TransactionImages],
            EventParticipants => &[EventParticipants],
            PayeeTransactions => &[PayeeTransactions],
            TransactionPayees => &[TransactionPayees],
            TransactionImages => &[TransactionImages],
        }
    }
}

/// A live stream of full query results
///
/// The first item is the current result; later items follow relevant writes.
/// A query failure is delivered once as `Err` and ends the stream.
pub struct Snapshots<T> {
    rx: mpsc::Receiver<Result<T>>,
}

impl<T> Snapshots<T> {
    /// Wait for the next snapshot; `None` once the stream has ended
    pub async fn next(&mut self) -> Option<Result<T>> {
        self.rx.recv().await
    }
}

impl<T> futures::Stream for Snapshots<T> {
    type Item = Result<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

impl Database {
    /// Run a blocking database call on the blocking thread pool
    pub async fn call<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Database) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.clone();
        tokio::task::spawn_blocking(move || f(&db)).await?
    }

    /// Subscribe to `query`, re-running it after each write to any of `tables`
    ///
    /// Must be called from within a Tokio runtime.
    pub fn watch<T, F>(&self, tables: &[Table], query: F) -> Snapshots<T>
    where
        F: Fn(&Database) -> Result<T> + Send + Sync + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = mpsc::channel(SNAPSHOT_BUFFER);
        // Subscribe before the first query so no write slips between them
        let mut changes = self.subscribe_changes();
        let tables = tables.to_vec();
        let query = Arc::new(query);
        let db = self.clone();

        tokio::spawn(async move {
            loop {
                let q = Arc::clone(&query);
                let snapshot = db.call(move |db| q(db)).await;
                let failed = snapshot.is_err();

                if tx.send(snapshot).await.is_err() {
                    debug!("Snapshot subscriber dropped");
                    return;
                }
                if failed {
                    return;
                }

                loop {
                    tokio::select! {
                        _ = tx.closed() => {
                            debug!("Snapshot subscriber dropped");
                            return;
                        }
                        msg = changes.recv() => match msg {
                            Ok(touched) if touched.iter().any(|t| tables.contains(t)) => break,
                            Ok(_) => continue,
                            // Missed some notifications; recomputing covers them
                            Err(RecvError::Lagged(_)) => break,
                            Err(RecvError::Closed) => return,
                        }
                    }
                }
            }
        });

        Snapshots { rx }
    }
}
