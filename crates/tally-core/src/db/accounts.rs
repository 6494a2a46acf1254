//! Account operations

use rusqlite::{params, OptionalExtension};

use super::rows::{select_list, AccountRow, ACCOUNT_COLUMNS};
use super::{new_id, Database, Table};
use crate::error::Result;

impl Database {
    /// Insert or replace an account by id, returning the id
    pub fn upsert_account(&self, account: &AccountRow) -> Result<i64> {
        let conn = self.conn()?;
        let id: i64 = conn.query_row(
            r#"
            INSERT INTO accounts (id, user_id, username, account_type, balance, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                user_id = excluded.user_id,
                username = excluded.username,
                account_type = excluded.account_type,
                balance = excluded.balance,
                created_at = excluded.created_at
            RETURNING id
            "#,
            params![
                new_id(account.id),
                account.user_id,
                account.username,
                account.account_type,
                account.balance,
                account.created_at
            ],
            |row| row.get(0),
        )?;

        self.notify(&[Table::Accounts]);
        Ok(id)
    }

    /// Get an account by ID
    pub fn get_account(&self, id: i64) -> Result<Option<AccountRow>> {
        let conn = self.conn()?;
        conn.query_row(
            &format!(
                "SELECT {} FROM accounts WHERE id = ?",
                select_list(None, ACCOUNT_COLUMNS)
            ),
            params![id],
            |row| AccountRow::read(row, 0),
        )
        .optional()
        .map_err(Into::into)
    }

    /// Get the first account with an exact username
    pub fn get_account_by_username(&self, username: &str) -> Result<Option<AccountRow>> {
        let conn = self.conn()?;
        conn.query_row(
            &format!(
                "SELECT {} FROM accounts WHERE username = ? ORDER BY id LIMIT 1",
                select_list(None, ACCOUNT_COLUMNS)
            ),
            params![username],
            |row| AccountRow::read(row, 0),
        )
        .optional()
        .map_err(Into::into)
    }

    /// List all accounts
    pub fn list_accounts(&self) -> Result<Vec<AccountRow>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM accounts ORDER BY id",
            select_list(None, ACCOUNT_COLUMNS)
        ))?;

        let accounts = stmt
            .query_map([], |row| AccountRow::read(row, 0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(accounts)
    }

    /// List accounts owned by a user, oldest first
    pub fn list_accounts_by_user(&self, user_id: i64) -> Result<Vec<AccountRow>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM accounts WHERE user_id = ? ORDER BY id",
            select_list(None, ACCOUNT_COLUMNS)
        ))?;

        let accounts = stmt
            .query_map(params![user_id], |row| AccountRow::read(row, 0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(accounts)
    }

    /// Update an account's fields by id
    pub fn update_account(&self, account: &AccountRow) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "UPDATE accounts SET user_id = ?, username = ?, account_type = ?, balance = ? WHERE id = ?",
            params![
                account.user_id,
                account.username,
                account.account_type,
                account.balance,
                account.id
            ],
        )?;
        self.notify(&[Table::Accounts]);
        Ok(())
    }

    /// Add `delta` to an account's balance
    pub fn adjust_account_balance(&self, id: i64, delta: f64) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "UPDATE accounts SET balance = balance + ? WHERE id = ?",
            params![delta, id],
        )?;
        self.notify(&[Table::Accounts]);
        Ok(())
    }

    /// Sum of balances across a user's accounts
    pub fn total_balance(&self, user_id: i64) -> Result<f64> {
        let conn = self.conn()?;
        let total: f64 = conn.query_row(
            "SELECT COALESCE(SUM(balance), 0.0) FROM accounts WHERE user_id = ?",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(total)
    }

    /// Delete an account; transactions, events, payees and locations cascade
    pub fn delete_account(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM accounts WHERE id = ?", params![id])?;
        self.notify(Table::Accounts.cascade());
        Ok(())
    }
}
