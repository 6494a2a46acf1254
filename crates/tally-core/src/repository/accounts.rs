use tracing::info;

use crate::db::rows::AccountRow;
use crate::db::{Database, Snapshots, Table};
use crate::error::Result;
use crate::models::Account;

#[derive(Clone)]
pub struct AccountRepository {
    db: Database,
}

impl AccountRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert or replace, returning the id
    pub async fn insert(&self, account: &Account) -> Result<i64> {
        let row = AccountRow::from(account);
        self.db.call(move |db| db.upsert_account(&row)).await
    }

    pub async fn update(&self, account: &Account) -> Result<()> {
        let row = AccountRow::from(account);
        self.db.call(move |db| db.update_account(&row)).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.db.call(move |db| db.delete_account(id)).await
    }

    pub async fn get(&self, id: i64) -> Result<Option<Account>> {
        self.db
            .call(move |db| Ok(db.get_account(id)?.map(Account::from)))
            .await
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<Account>> {
        let username = username.to_string();
        self.db
            .call(move |db| Ok(db.get_account_by_username(&username)?.map(Account::from)))
            .await
    }

    pub async fn list_by_user(&self, user_id: i64) -> Result<Vec<Account>> {
        self.db
            .call(move |db| accounts_of(db, user_id))
            .await
    }

    pub async fn adjust_balance(&self, id: i64, delta: f64) -> Result<()> {
        self.db
            .call(move |db| db.adjust_account_balance(id, delta))
            .await
    }

    /// Live list of a user's accounts
    pub fn watch_by_user(&self, user_id: i64) -> Snapshots<Vec<Account>> {
        self.db
            .watch(&[Table::Accounts], move |db| accounts_of(db, user_id))
    }

    /// Live sum of a user's balances
    pub fn watch_total_balance(&self, user_id: i64) -> Snapshots<f64> {
        self.db
            .watch(&[Table::Accounts], move |db| db.total_balance(user_id))
    }

    /// Insert `account` unless one with the same username exists
    ///
    /// Returns the id of the new or existing account.
    pub async fn initialize_admin(&self, account: &Account) -> Result<i64> {
        let row = AccountRow::from(account);
        self.db
            .call(move |db| {
                if let Some(existing) = db.get_account_by_username(&row.username)? {
                    return Ok(existing.id);
                }
                let id = db.upsert_account(&row)?;
                info!(account_id = id, username = %row.username, "Created admin account");
                Ok(id)
            })
            .await
    }
}

fn accounts_of(db: &Database, user_id: i64) -> Result<Vec<Account>> {
    Ok(db
        .list_accounts_by_user(user_id)?
        .into_iter()
        .map(Account::from)
        .collect())
}
