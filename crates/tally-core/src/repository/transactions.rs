use chrono::{DateTime, Utc};

use crate::db::rows::TransactionRow;
use crate::db::{Database, Snapshots, Table};
use crate::error::Result;
use crate::mapper::to_millis;
use crate::models::{Transaction, TransactionDetails};

/// Every table a detail read joins
const DETAIL_TABLES: &[Table] = &[
    Table::Transactions,
    Table::TransactionPayees,
    Table::Categories,
    Table::Accounts,
    Table::Events,
    Table::EventParticipants,
    Table::Locations,
    Table::Lenders,
    Table::Borrowers,
    Table::Payees,
];

#[derive(Clone)]
pub struct TransactionRepository {
    db: Database,
}

impl TransactionRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert or replace with its payee links, returning the id
    pub async fn insert(&self, transaction: &Transaction) -> Result<i64> {
        let row = TransactionRow::from(transaction);
        let payee_ids = transaction.payee_ids.clone();
        self.db
            .call(move |db| db.insert_transaction(&row, &payee_ids))
            .await
    }

    pub async fn update(&self, transaction: &Transaction) -> Result<()> {
        let row = TransactionRow::from(transaction);
        let payee_ids = transaction.payee_ids.clone();
        self.db
            .call(move |db| db.update_transaction(&row, &payee_ids))
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.db.call(move |db| db.delete_transaction(id)).await
    }

    pub async fn get(&self, id: i64) -> Result<Option<Transaction>> {
        self.db
            .call(move |db| {
                let Some(row) = db.get_transaction(id)? else {
                    return Ok(None);
                };
                let payee_ids = db.get_transaction_payee_ids(id)?;
                Ok(Some(Transaction::from((row, payee_ids))))
            })
            .await
    }

    pub async fn details(&self, id: i64) -> Result<Option<TransactionDetails>> {
        self.db
            .call(move |db| Ok(db.get_transaction_details(id)?.map(TransactionDetails::from)))
            .await
    }

    pub async fn list_details(&self, account_id: i64) -> Result<Vec<TransactionDetails>> {
        self.db
            .call(move |db| details_of(db, account_id))
            .await
    }

    pub async fn list_details_in_range(
        &self,
        account_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<TransactionDetails>> {
        let (from, to) = (to_millis(&from), to_millis(&to));
        self.db
            .call(move |db| details_in_range(db, account_id, from, to))
            .await
    }

    /// Live detail list of an account, newest first
    pub fn watch_details(&self, account_id: i64) -> Snapshots<Vec<TransactionDetails>> {
        self.db
            .watch(DETAIL_TABLES, move |db| details_of(db, account_id))
    }

    /// Live detail list of an account within `[from, to]`, newest first
    pub fn watch_details_in_range(
        &self,
        account_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Snapshots<Vec<TransactionDetails>> {
        self.watch_in_range_with(account_id, from, to, |details| details)
    }

    /// Like [`Self::watch_details_in_range`], reduced through `f` on every change
    pub fn watch_in_range_with<T, F>(
        &self,
        account_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        f: F,
    ) -> Snapshots<T>
    where
        F: Fn(Vec<TransactionDetails>) -> T + Send + Sync + 'static,
        T: Send + 'static,
    {
        let (from, to) = (to_millis(&from), to_millis(&to));
        self.db.watch(DETAIL_TABLES, move |db| {
            Ok(f(details_in_range(db, account_id, from, to)?))
        })
    }

    pub fn watch_details_by_event(&self, event_id: i64) -> Snapshots<Vec<TransactionDetails>> {
        self.db.watch(DETAIL_TABLES, move |db| {
            Ok(db
                .list_transaction_details_by_event(event_id)?
                .into_iter()
                .map(TransactionDetails::from)
                .collect())
        })
    }
}

fn details_of(db: &Database, account_id: i64) -> Result<Vec<TransactionDetails>> {
    Ok(db
        .list_transaction_details(account_id)?
        .into_iter()
        .map(TransactionDetails::from)
        .collect())
}

fn details_in_range(
    db: &Database,
    account_id: i64,
    from: i64,
    to: i64,
) -> Result<Vec<TransactionDetails>> {
    Ok(db
        .list_transaction_details_in_range(account_id, from, to)?
        .into_iter()
        .map(TransactionDetails::from)
        .collect())
}
