use super::like_pattern;
use crate::db::rows::{CounterpartyRow, PayeeRow, PayeeTransactionRow};
use crate::db::{CounterpartyTable, Database, Snapshots, Table};
use crate::error::Result;
use crate::models::{Counterparty, Payee, PayeeTransaction, PayeeType};

fn payees(rows: Vec<PayeeRow>) -> Vec<Payee> {
    rows.into_iter().map(Payee::from).collect()
}

#[derive(Clone)]
pub struct PayeeRepository {
    db: Database,
}

impl PayeeRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert or replace, returning the id
    pub async fn insert(&self, payee: &Payee) -> Result<i64> {
        let row = PayeeRow::from(payee);
        self.db.call(move |db| db.upsert_payee(&row)).await
    }

    pub async fn update(&self, payee: &Payee) -> Result<()> {
        let row = PayeeRow::from(payee);
        self.db.call(move |db| db.update_payee(&row)).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.db.call(move |db| db.delete_payee(id)).await
    }

    pub async fn get(&self, id: i64) -> Result<Option<Payee>> {
        self.db
            .call(move |db| Ok(db.get_payee(id)?.map(Payee::from)))
            .await
    }

    /// Exact, case-sensitive name match
    pub async fn get_by_name(
        &self,
        account_id: i64,
        name: &str,
        payee_type: PayeeType,
    ) -> Result<Option<Payee>> {
        let name = name.to_string();
        self.db
            .call(move |db| {
                Ok(db
                    .get_payee_by_name(account_id, &name, payee_type.as_str())?
                    .map(Payee::from))
            })
            .await
    }

    pub async fn list_by_type(&self, account_id: i64, payee_type: PayeeType) -> Result<Vec<Payee>> {
        self.db
            .call(move |db| Ok(payees(db.list_payees_by_type(account_id, payee_type.as_str())?)))
            .await
    }

    pub fn watch_by_type(&self, account_id: i64, payee_type: PayeeType) -> Snapshots<Vec<Payee>> {
        self.db.watch(&[Table::Payees], move |db| {
            Ok(payees(db.list_payees_by_type(account_id, payee_type.as_str())?))
        })
    }

    /// Payees entered by hand rather than picked from contacts
    pub fn watch_recent_by_type(
        &self,
        account_id: i64,
        payee_type: PayeeType,
    ) -> Snapshots<Vec<Payee>> {
        self.db.watch(&[Table::Payees], move |db| {
            Ok(payees(
                db.list_recent_payees_by_type(account_id, payee_type.as_str())?,
            ))
        })
    }

    /// Payees of a type whose name contains `query`, by name
    pub fn watch_search_by_type(
        &self,
        account_id: i64,
        query: &str,
        payee_type: PayeeType,
    ) -> Snapshots<Vec<Payee>> {
        let pattern = like_pattern(query);
        self.db.watch(&[Table::Payees], move |db| {
            Ok(payees(db.search_payees_by_type(
                account_id,
                &pattern,
                payee_type.as_str(),
            )?))
        })
    }

    pub async fn search_by_type(
        &self,
        account_id: i64,
        query: &str,
        payee_type: PayeeType,
    ) -> Result<Vec<Payee>> {
        let pattern = like_pattern(query);
        self.db
            .call(move |db| {
                Ok(payees(db.search_payees_by_type(
                    account_id,
                    &pattern,
                    payee_type.as_str(),
                )?))
            })
            .await
    }
}

fn entries(rows: Vec<PayeeTransactionRow>) -> Vec<PayeeTransaction> {
    rows.into_iter().map(PayeeTransaction::from).collect()
}

#[derive(Clone)]
pub struct PayeeTransactionRepository {
    db: Database,
}

impl PayeeTransactionRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn insert(&self, entry: &PayeeTransaction) -> Result<i64> {
        let row = PayeeTransactionRow::from(entry);
        self.db
            .call(move |db| db.upsert_payee_transaction(&row))
            .await
    }

    pub async fn update(&self, entry: &PayeeTransaction) -> Result<()> {
        let row = PayeeTransactionRow::from(entry);
        self.db
            .call(move |db| db.update_payee_transaction(&row))
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.db
            .call(move |db| db.delete_payee_transaction(id))
            .await
    }

    pub async fn get(&self, id: i64) -> Result<Option<PayeeTransaction>> {
        self.db
            .call(move |db| Ok(db.get_payee_transaction(id)?.map(PayeeTransaction::from)))
            .await
    }

    pub async fn get_by_name(&self, account_id: i64, name: &str) -> Result<Option<PayeeTransaction>> {
        let name = name.to_string();
        self.db
            .call(move |db| {
                Ok(db
                    .get_payee_transaction_by_name(account_id, &name)?
                    .map(PayeeTransaction::from))
            })
            .await
    }

    pub fn watch_all(&self, account_id: i64) -> Snapshots<Vec<PayeeTransaction>> {
        self.db.watch(&[Table::PayeeTransactions], move |db| {
            Ok(entries(db.list_payee_transactions(account_id)?))
        })
    }

    pub fn watch_recent(&self, account_id: i64) -> Snapshots<Vec<PayeeTransaction>> {
        self.db.watch(&[Table::PayeeTransactions], move |db| {
            Ok(entries(db.list_recent_payee_transactions(account_id)?))
        })
    }

    pub fn watch_search(&self, account_id: i64, query: &str) -> Snapshots<Vec<PayeeTransaction>> {
        let pattern = like_pattern(query);
        self.db.watch(&[Table::PayeeTransactions], move |db| {
            Ok(entries(db.search_payee_transactions(account_id, &pattern)?))
        })
    }
}

fn parties(rows: Vec<CounterpartyRow>) -> Vec<Counterparty> {
    rows.into_iter().map(Counterparty::from).collect()
}

/// Lender or borrower repository, depending on how it was built
#[derive(Clone)]
pub struct CounterpartyRepository {
    db: Database,
    table: CounterpartyTable,
}

impl CounterpartyRepository {
    pub fn lenders(db: Database) -> Self {
        Self {
            db,
            table: CounterpartyTable::Lenders,
        }
    }

    pub fn borrowers(db: Database) -> Self {
        Self {
            db,
            table: CounterpartyTable::Borrowers,
        }
    }

    fn changes(&self) -> [Table; 1] {
        [self.table.table()]
    }

    pub async fn insert(&self, party: &Counterparty) -> Result<i64> {
        let (row, table) = (CounterpartyRow::from(party), self.table);
        self.db
            .call(move |db| db.upsert_counterparty(table, &row))
            .await
    }

    pub async fn update(&self, party: &Counterparty) -> Result<()> {
        let (row, table) = (CounterpartyRow::from(party), self.table);
        self.db
            .call(move |db| db.update_counterparty(table, &row))
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let table = self.table;
        self.db
            .call(move |db| db.delete_counterparty(table, id))
            .await
    }

    pub async fn get(&self, id: i64) -> Result<Option<Counterparty>> {
        let table = self.table;
        self.db
            .call(move |db| Ok(db.get_counterparty(table, id)?.map(Counterparty::from)))
            .await
    }

    /// Exact, case-sensitive name match
    pub async fn get_by_name(&self, account_id: i64, name: &str) -> Result<Option<Counterparty>> {
        let (name, table) = (name.to_string(), self.table);
        self.db
            .call(move |db| {
                Ok(db
                    .get_counterparty_by_name(table, account_id, &name)?
                    .map(Counterparty::from))
            })
            .await
    }

    pub fn watch_all(&self, account_id: i64) -> Snapshots<Vec<Counterparty>> {
        let table = self.table;
        self.db.watch(&self.changes(), move |db| {
            Ok(parties(db.list_counterparties(table, account_id)?))
        })
    }

    pub fn watch_search(&self, account_id: i64, query: &str) -> Snapshots<Vec<Counterparty>> {
        let (pattern, table) = (like_pattern(query), self.table);
        self.db.watch(&self.changes(), move |db| {
            Ok(parties(db.search_counterparties(table, account_id, &pattern)?))
        })
    }
}
