//! Transaction operations: payee joins and detail reads
//!
//! Detail reads JOIN the required category and account, LEFT JOIN the
//! optional event, location, lender and borrower, then attach event
//! participants and payees with one batched query each.

use std::collections::HashMap;

use rusqlite::{params, params_from_iter, OptionalExtension};

use super::events::{load_participants, ID_BATCH};
use super::rows::{
    select_list, AccountRow, CategoryRow, CounterpartyRow, EventRow, EventWithParticipantsRow,
    LocationRow, PayeeRow, TransactionRow, TransactionWithDetailsRow, ACCOUNT_COLUMNS,
    CATEGORY_COLUMNS, COUNTERPARTY_COLUMNS, EVENT_COLUMNS, LOCATION_COLUMNS, PAYEE_COLUMNS,
    TRANSACTION_COLUMNS,
};
use super::{in_transaction, new_id, Database, DbConn, Table};
use crate::error::Result;

/// Tables a transaction write touches
const WRITE_TABLES: &[Table] = &[Table::Transactions, Table::TransactionPayees];

fn insert_payee_links(conn: &DbConn, transaction_id: i64, payee_ids: &[i64]) -> Result<()> {
    let mut stmt = conn.prepare(
        "INSERT OR IGNORE INTO transaction_payees (transaction_id, payee_id) VALUES (?, ?)",
    )?;
    for payee_id in payee_ids {
        stmt.execute(params![transaction_id, payee_id])?;
    }
    Ok(())
}

fn details_select() -> String {
    format!(
        r#"
        SELECT {}, {}, {}, {}, {}, {}, {}
        FROM transactions t
        INNER JOIN categories c ON c.id = t.category_id
        INNER JOIN accounts a ON a.id = t.account_id
        LEFT JOIN events e ON e.id = t.event_id
        LEFT JOIN locations l ON l.id = t.location_id
        LEFT JOIN lenders ld ON ld.id = t.lender_id
        LEFT JOIN borrowers b ON b.id = t.borrower_id
        "#,
        select_list(Some("t"), TRANSACTION_COLUMNS),
        select_list(Some("c"), CATEGORY_COLUMNS),
        select_list(Some("a"), ACCOUNT_COLUMNS),
        select_list(Some("e"), EVENT_COLUMNS),
        select_list(Some("l"), LOCATION_COLUMNS),
        select_list(Some("ld"), COUNTERPARTY_COLUMNS),
        select_list(Some("b"), COUNTERPARTY_COLUMNS),
    )
}

/// Joined row before participants and payees are attached
struct JoinedRow {
    transaction: TransactionRow,
    category: CategoryRow,
    account: AccountRow,
    event: Option<EventRow>,
    location: Option<LocationRow>,
    lender: Option<CounterpartyRow>,
    borrower: Option<CounterpartyRow>,
}

fn read_joined(row: &rusqlite::Row) -> rusqlite::Result<JoinedRow> {
    let mut at = 0;
    let transaction = TransactionRow::read(row, at)?;
    at += TRANSACTION_COLUMNS.len();
    let category = CategoryRow::read(row, at)?;
    at += CATEGORY_COLUMNS.len();
    let account = AccountRow::read(row, at)?;
    at += ACCOUNT_COLUMNS.len();
    let event = EventRow::read_optional(row, at)?;
    at += EVENT_COLUMNS.len();
    let location = LocationRow::read_optional(row, at)?;
    at += LOCATION_COLUMNS.len();
    let lender = CounterpartyRow::read_optional(row, at)?;
    at += COUNTERPARTY_COLUMNS.len();
    let borrower = CounterpartyRow::read_optional(row, at)?;

    Ok(JoinedRow {
        transaction,
        category,
        account,
        event,
        location,
        lender,
        borrower,
    })
}

/// Payees per transaction, in the order they were linked
fn load_payees(conn: &DbConn, transaction_ids: &[i64]) -> Result<HashMap<i64, Vec<PayeeRow>>> {
    let mut by_transaction: HashMap<i64, Vec<PayeeRow>> = HashMap::new();

    for chunk in transaction_ids.chunks(ID_BATCH) {
        let placeholders = vec!["?"; chunk.len()].join(", ");
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT tp.transaction_id, {}
            FROM transaction_payees tp
            INNER JOIN payees p ON p.id = tp.payee_id
            WHERE tp.transaction_id IN ({})
            ORDER BY tp.transaction_id, tp.id
            "#,
            select_list(Some("p"), PAYEE_COLUMNS),
            placeholders
        ))?;

        let rows = stmt
            .query_map(params_from_iter(chunk.iter()), |row| {
                Ok((row.get::<_, i64>(0)?, PayeeRow::read(row, 1)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        for (transaction_id, payee) in rows {
            by_transaction.entry(transaction_id).or_default().push(payee);
        }
    }

    Ok(by_transaction)
}

fn query_details(
    conn: &DbConn,
    filter: &str,
    args: &[&dyn rusqlite::ToSql],
) -> Result<Vec<TransactionWithDetailsRow>> {
    let mut stmt = conn.prepare(&format!(
        "{} WHERE {} ORDER BY t.created_at DESC, t.id DESC",
        details_select(),
        filter
    ))?;

    let joined = stmt
        .query_map(args, read_joined)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let transaction_ids: Vec<i64> = joined.iter().map(|j| j.transaction.id).collect();
    let mut event_ids: Vec<i64> = joined
        .iter()
        .filter_map(|j| j.event.as_ref().map(|e| e.id))
        .collect();
    event_ids.sort_unstable();
    event_ids.dedup();

    let mut payees = load_payees(conn, &transaction_ids)?;
    let participants = load_participants(conn, &event_ids)?;

    Ok(joined
        .into_iter()
        .map(|j| {
            let event = j.event.map(|event| EventWithParticipantsRow {
                participants: participants.get(&event.id).cloned().unwrap_or_default(),
                event,
            });
            TransactionWithDetailsRow {
                payees: payees.remove(&j.transaction.id).unwrap_or_default(),
                transaction: j.transaction,
                category: j.category,
                account: j.account,
                event,
                location: j.location,
                lender: j.lender,
                borrower: j.borrower,
            }
        })
        .collect())
}

impl Database {
    /// Insert or replace a transaction and link its payees in one SQL transaction
    ///
    /// Returns the transaction id.
    pub fn insert_transaction(&self, transaction: &TransactionRow, payee_ids: &[i64]) -> Result<i64> {
        let conn = self.conn()?;

        let id = in_transaction(&conn, |conn| {
            let id: i64 = conn.query_row(
                r#"
                INSERT INTO transactions (id, amount, created_at, description, category_id,
                                          account_id, event_id, location_id, lender_id, borrower_id)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    amount = excluded.amount,
                    created_at = excluded.created_at,
                    description = excluded.description,
                    category_id = excluded.category_id,
                    account_id = excluded.account_id,
                    event_id = excluded.event_id,
                    location_id = excluded.location_id,
                    lender_id = excluded.lender_id,
                    borrower_id = excluded.borrower_id
                RETURNING id
                "#,
                params![
                    new_id(transaction.id),
                    transaction.amount,
                    transaction.created_at,
                    transaction.description,
                    transaction.category_id,
                    transaction.account_id,
                    transaction.event_id,
                    transaction.location_id,
                    transaction.lender_id,
                    transaction.borrower_id
                ],
                |row| row.get(0),
            )?;

            insert_payee_links(conn, id, payee_ids)?;
            Ok(id)
        })?;

        self.notify(WRITE_TABLES);
        Ok(id)
    }

    /// Update a transaction by id and replace its payee links
    pub fn update_transaction(&self, transaction: &TransactionRow, payee_ids: &[i64]) -> Result<()> {
        let conn = self.conn()?;

        in_transaction(&conn, |conn| {
            conn.execute(
                r#"
                UPDATE transactions
                SET amount = ?, created_at = ?, description = ?, category_id = ?, account_id = ?,
                    event_id = ?, location_id = ?, lender_id = ?, borrower_id = ?
                WHERE id = ?
                "#,
                params![
                    transaction.amount,
                    transaction.created_at,
                    transaction.description,
                    transaction.category_id,
                    transaction.account_id,
                    transaction.event_id,
                    transaction.location_id,
                    transaction.lender_id,
                    transaction.borrower_id,
                    transaction.id
                ],
            )?;

            conn.execute(
                "DELETE FROM transaction_payees WHERE transaction_id = ?",
                params![transaction.id],
            )?;
            insert_payee_links(conn, transaction.id, payee_ids)
        })?;

        self.notify(WRITE_TABLES);
        Ok(())
    }

    /// Delete a transaction; its payee links and image rows cascade
    pub fn delete_transaction(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM transactions WHERE id = ?", params![id])?;
        self.notify(Table::Transactions.cascade());
        Ok(())
    }

    /// Get a bare transaction row by ID
    pub fn get_transaction(&self, id: i64) -> Result<Option<TransactionRow>> {
        let conn = self.conn()?;
        conn.query_row(
            &format!(
                "SELECT {} FROM transactions WHERE id = ?",
                select_list(None, TRANSACTION_COLUMNS)
            ),
            params![id],
            |row| TransactionRow::read(row, 0),
        )
        .optional()
        .map_err(Into::into)
    }

    /// Payee ids linked to a transaction, in link order
    pub fn get_transaction_payee_ids(&self, transaction_id: i64) -> Result<Vec<i64>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT payee_id FROM transaction_payees WHERE transaction_id = ? ORDER BY id",
        )?;

        let ids = stmt
            .query_map(params![transaction_id], |row| row.get(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(ids)
    }

    /// Get one transaction with everything it references
    pub fn get_transaction_details(&self, id: i64) -> Result<Option<TransactionWithDetailsRow>> {
        let conn = self.conn()?;
        Ok(query_details(&conn, "t.id = ?", params![id])?.into_iter().next())
    }

    /// An account's transactions with details, newest first
    pub fn list_transaction_details(&self, account_id: i64) -> Result<Vec<TransactionWithDetailsRow>> {
        let conn = self.conn()?;
        query_details(&conn, "t.account_id = ?", params![account_id])
    }

    /// An account's transactions between `from` and `to` (inclusive, epoch millis), newest first
    pub fn list_transaction_details_in_range(
        &self,
        account_id: i64,
        from: i64,
        to: i64,
    ) -> Result<Vec<TransactionWithDetailsRow>> {
        let conn = self.conn()?;
        query_details(
            &conn,
            "t.account_id = ? AND t.created_at BETWEEN ? AND ?",
            params![account_id, from, to],
        )
    }

    /// An event's transactions with details, newest first
    pub fn list_transaction_details_by_event(
        &self,
        event_id: i64,
    ) -> Result<Vec<TransactionWithDetailsRow>> {
        let conn = self.conn()?;
        query_details(&conn, "t.event_id = ?", params![event_id])
    }

    pub fn count_transactions(&self, account_id: i64) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM transactions WHERE account_id = ?",
            params![account_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
