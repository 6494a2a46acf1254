//! Payee, payee-transaction, lender and borrower operations
//!
//! Name lookups are exact and case-sensitive. Searches take a LIKE pattern
//! as-is; callers add the wildcards.

use rusqlite::{params, OptionalExtension};

use super::rows::{
    select_list, CounterpartyRow, PayeeRow, PayeeTransactionRow, COUNTERPARTY_COLUMNS,
    PAYEE_COLUMNS, PAYEE_TRANSACTION_COLUMNS,
};
use super::{new_id, Database, Table};
use crate::error::Result;

/// Which of the two identically-shaped counterparty tables to use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterpartyTable {
    Lenders,
    Borrowers,
}

impl CounterpartyTable {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lenders => "lenders",
            Self::Borrowers => "borrowers",
        }
    }

    /// Change-notification tag for this table
    pub fn table(&self) -> Table {
        match self {
            Self::Lenders => Table::Lenders,
            Self::Borrowers => Table::Borrowers,
        }
    }
}

impl Database {
    // ========== Payees ==========

    /// Insert or replace a payee by id, returning the id
    pub fn upsert_payee(&self, payee: &PayeeRow) -> Result<i64> {
        let conn = self.conn()?;
        let id: i64 = conn.query_row(
            r#"
            INSERT INTO payees (id, name, account_id, payee_type, is_from_contacts,
                                contact_id, phone_number, email, notes)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                account_id = excluded.account_id,
                payee_type = excluded.payee_type,
                is_from_contacts = excluded.is_from_contacts,
                contact_id = excluded.contact_id,
                phone_number = excluded.phone_number,
                email = excluded.email,
                notes = excluded.notes
            RETURNING id
            "#,
            params![
                new_id(payee.id),
                payee.name,
                payee.account_id,
                payee.payee_type,
                payee.is_from_contacts,
                payee.contact_id,
                payee.phone_number,
                payee.email,
                payee.notes
            ],
            |row| row.get(0),
        )?;

        self.notify(&[Table::Payees]);
        Ok(id)
    }

    /// Update a payee by id
    pub fn update_payee(&self, payee: &PayeeRow) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            UPDATE payees
            SET name = ?, account_id = ?, payee_type = ?, is_from_contacts = ?,
                contact_id = ?, phone_number = ?, email = ?, notes = ?
            WHERE id = ?
            "#,
            params![
                payee.name,
                payee.account_id,
                payee.payee_type,
                payee.is_from_contacts,
                payee.contact_id,
                payee.phone_number,
                payee.email,
                payee.notes,
                payee.id
            ],
        )?;
        self.notify(&[Table::Payees]);
        Ok(())
    }

    /// Delete a payee; it is detached from its transactions
    pub fn delete_payee(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM payees WHERE id = ?", params![id])?;
        self.notify(Table::Payees.cascade());
        Ok(())
    }

    /// Get a payee by ID
    pub fn get_payee(&self, id: i64) -> Result<Option<PayeeRow>> {
        let conn = self.conn()?;
        conn.query_row(
            &format!(
                "SELECT {} FROM payees WHERE id = ?",
                select_list(None, PAYEE_COLUMNS)
            ),
            params![id],
            |row| PayeeRow::read(row, 0),
        )
        .optional()
        .map_err(Into::into)
    }

    /// List an account's payees of one type, by name
    pub fn list_payees_by_type(&self, account_id: i64, payee_type: &str) -> Result<Vec<PayeeRow>> {
        self.query_payees(
            "account_id = ? AND payee_type = ?",
            params![account_id, payee_type],
        )
    }

    /// Payees that were typed in rather than picked from contacts
    pub fn list_recent_payees_by_type(
        &self,
        account_id: i64,
        payee_type: &str,
    ) -> Result<Vec<PayeeRow>> {
        self.query_payees(
            "account_id = ? AND payee_type = ? AND is_from_contacts = 0",
            params![account_id, payee_type],
        )
    }

    /// Exact, case-sensitive name lookup within an account and type
    pub fn get_payee_by_name(
        &self,
        account_id: i64,
        name: &str,
        payee_type: &str,
    ) -> Result<Option<PayeeRow>> {
        let conn = self.conn()?;
        conn.query_row(
            &format!(
                "SELECT {} FROM payees
                 WHERE name = ? COLLATE BINARY AND payee_type = ? AND account_id = ?
                 ORDER BY id LIMIT 1",
                select_list(None, PAYEE_COLUMNS)
            ),
            params![name, payee_type, account_id],
            |row| PayeeRow::read(row, 0),
        )
        .optional()
        .map_err(Into::into)
    }

    /// Payees of one type whose name matches a LIKE pattern, by name
    pub fn search_payees_by_type(
        &self,
        account_id: i64,
        pattern: &str,
        payee_type: &str,
    ) -> Result<Vec<PayeeRow>> {
        self.query_payees(
            "account_id = ? AND payee_type = ? AND name LIKE ? ESCAPE '\\'",
            params![account_id, payee_type, pattern],
        )
    }

    fn query_payees(&self, filter: &str, args: &[&dyn rusqlite::ToSql]) -> Result<Vec<PayeeRow>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM payees WHERE {} ORDER BY name ASC, id",
            select_list(None, PAYEE_COLUMNS),
            filter
        ))?;

        let payees = stmt
            .query_map(args, |row| PayeeRow::read(row, 0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(payees)
    }

    // ========== Payee transactions ==========

    /// Insert or replace a payee-transaction entry, returning the id
    pub fn upsert_payee_transaction(&self, entry: &PayeeTransactionRow) -> Result<i64> {
        let conn = self.conn()?;
        let id: i64 = conn.query_row(
            r#"
            INSERT INTO payee_transactions (id, name, account_id, is_from_contacts, contact_id)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                account_id = excluded.account_id,
                is_from_contacts = excluded.is_from_contacts,
                contact_id = excluded.contact_id
            RETURNING id
            "#,
            params![
                new_id(entry.id),
                entry.name,
                entry.account_id,
                entry.is_from_contacts,
                entry.contact_id
            ],
            |row| row.get(0),
        )?;

        self.notify(&[Table::PayeeTransactions]);
        Ok(id)
    }

    pub fn update_payee_transaction(&self, entry: &PayeeTransactionRow) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "UPDATE payee_transactions SET name = ?, account_id = ?, is_from_contacts = ?, contact_id = ? WHERE id = ?",
            params![
                entry.name,
                entry.account_id,
                entry.is_from_contacts,
                entry.contact_id,
                entry.id
            ],
        )?;
        self.notify(&[Table::PayeeTransactions]);
        Ok(())
    }

    pub fn delete_payee_transaction(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM payee_transactions WHERE id = ?", params![id])?;
        self.notify(&[Table::PayeeTransactions]);
        Ok(())
    }

    pub fn get_payee_transaction(&self, id: i64) -> Result<Option<PayeeTransactionRow>> {
        let conn = self.conn()?;
        conn.query_row(
            &format!(
                "SELECT {} FROM payee_transactions WHERE id = ?",
                select_list(None, PAYEE_TRANSACTION_COLUMNS)
            ),
            params![id],
            |row| PayeeTransactionRow::read(row, 0),
        )
        .optional()
        .map_err(Into::into)
    }

    pub fn get_payee_transaction_by_name(
        &self,
        account_id: i64,
        name: &str,
    ) -> Result<Option<PayeeTransactionRow>> {
        let conn = self.conn()?;
        conn.query_row(
            &format!(
                "SELECT {} FROM payee_transactions
                 WHERE name = ? COLLATE BINARY AND account_id = ?
                 ORDER BY id LIMIT 1",
                select_list(None, PAYEE_TRANSACTION_COLUMNS)
            ),
            params![name, account_id],
            |row| PayeeTransactionRow::read(row, 0),
        )
        .optional()
        .map_err(Into::into)
    }

    pub fn list_payee_transactions(&self, account_id: i64) -> Result<Vec<PayeeTransactionRow>> {
        self.query_payee_transactions("account_id = ?", params![account_id])
    }

    /// Entries typed in rather than picked from contacts
    pub fn list_recent_payee_transactions(
        &self,
        account_id: i64,
    ) -> Result<Vec<PayeeTransactionRow>> {
        self.query_payee_transactions(
            "account_id = ? AND is_from_contacts = 0",
            params![account_id],
        )
    }

    pub fn search_payee_transactions(
        &self,
        account_id: i64,
        pattern: &str,
    ) -> Result<Vec<PayeeTransactionRow>> {
        self.query_payee_transactions(
            "account_id = ? AND name LIKE ? ESCAPE '\\'",
            params![account_id, pattern],
        )
    }

    fn query_payee_transactions(
        &self,
        filter: &str,
        args: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<PayeeTransactionRow>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM payee_transactions WHERE {} ORDER BY name ASC, id",
            select_list(None, PAYEE_TRANSACTION_COLUMNS),
            filter
        ))?;

        let entries = stmt
            .query_map(args, |row| PayeeTransactionRow::read(row, 0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    // ========== Lenders and borrowers ==========

    /// Insert or replace a lender or borrower, returning the id
    pub fn upsert_counterparty(
        &self,
        table: CounterpartyTable,
        party: &CounterpartyRow,
    ) -> Result<i64> {
        let conn = self.conn()?;
        let id: i64 = conn.query_row(
            &format!(
                r#"
                INSERT INTO {} (id, name, phone_number, email, account_id, notes)
                VALUES (?, ?, ?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    phone_number = excluded.phone_number,
                    email = excluded.email,
                    account_id = excluded.account_id,
                    notes = excluded.notes
                RETURNING id
                "#,
                table.as_str()
            ),
            params![
                new_id(party.id),
                party.name,
                party.phone_number,
                party.email,
                party.account_id,
                party.notes
            ],
            |row| row.get(0),
        )?;

        self.notify(&[table.table()]);
        Ok(id)
    }

    pub fn update_counterparty(
        &self,
        table: CounterpartyTable,
        party: &CounterpartyRow,
    ) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            &format!(
                "UPDATE {} SET name = ?, phone_number = ?, email = ?, account_id = ?, notes = ? WHERE id = ?",
                table.as_str()
            ),
            params![
                party.name,
                party.phone_number,
                party.email,
                party.account_id,
                party.notes,
                party.id
            ],
        )?;
        self.notify(&[table.table()]);
        Ok(())
    }

    /// Delete a lender or borrower; referencing transactions keep existing
    pub fn delete_counterparty(&self, table: CounterpartyTable, id: i64) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            &format!("DELETE FROM {} WHERE id = ?", table.as_str()),
            params![id],
        )?;
        self.notify(table.table().cascade());
        Ok(())
    }

    pub fn get_counterparty(
        &self,
        table: CounterpartyTable,
        id: i64,
    ) -> Result<Option<CounterpartyRow>> {
        let conn = self.conn()?;
        conn.query_row(
            &format!(
                "SELECT {} FROM {} WHERE id = ?",
                select_list(None, COUNTERPARTY_COLUMNS),
                table.as_str()
            ),
            params![id],
            |row| CounterpartyRow::read(row, 0),
        )
        .optional()
        .map_err(Into::into)
    }

    /// Exact, case-sensitive name lookup within an account
    pub fn get_counterparty_by_name(
        &self,
        table: CounterpartyTable,
        account_id: i64,
        name: &str,
    ) -> Result<Option<CounterpartyRow>> {
        let conn = self.conn()?;
        conn.query_row(
            &format!(
                "SELECT {} FROM {} WHERE name = ? COLLATE BINARY AND account_id = ? ORDER BY id LIMIT 1",
                select_list(None, COUNTERPARTY_COLUMNS),
                table.as_str()
            ),
            params![name, account_id],
            |row| CounterpartyRow::read(row, 0),
        )
        .optional()
        .map_err(Into::into)
    }

    pub fn list_counterparties(
        &self,
        table: CounterpartyTable,
        account_id: i64,
    ) -> Result<Vec<CounterpartyRow>> {
        self.query_counterparties(table, "account_id = ?", params![account_id])
    }

    pub fn search_counterparties(
        &self,
        table: CounterpartyTable,
        account_id: i64,
        pattern: &str,
    ) -> Result<Vec<CounterpartyRow>> {
        self.query_counterparties(
            table,
            "account_id = ? AND name LIKE ? ESCAPE '\\'",
            params![account_id, pattern],
        )
    }

    fn query_counterparties(
        &self,
        table: CounterpartyTable,
        filter: &str,
        args: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<CounterpartyRow>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM {} WHERE {} ORDER BY name ASC, id",
            select_list(None, COUNTERPARTY_COLUMNS),
            table.as_str(),
            filter
        ))?;

        let parties = stmt
            .query_map(args, |row| CounterpartyRow::read(row, 0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(parties)
    }
}
