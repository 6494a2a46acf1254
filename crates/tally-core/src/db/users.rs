//! User operations

use rusqlite::{params, OptionalExtension};

use super::rows::{select_list, UserRow, USER_COLUMNS};
use super::{new_id, Database, Table};
use crate::error::Result;

impl Database {
    /// Insert or replace a user by id, returning the id
    pub fn upsert_user(&self, user: &UserRow) -> Result<i64> {
        let conn = self.conn()?;
        let id: i64 = conn.query_row(
            r#"
            INSERT INTO users (id, name, email, auth_uid, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                email = excluded.email,
                auth_uid = excluded.auth_uid,
                created_at = excluded.created_at,
                updated_at = excluded.updated_at
            RETURNING id
            "#,
            params![
                new_id(user.id),
                user.name,
                user.email,
                user.auth_uid,
                user.created_at,
                user.updated_at
            ],
            |row| row.get(0),
        )?;

        self.notify(&[Table::Users]);
        Ok(id)
    }

    /// Get a user by ID
    pub fn get_user(&self, id: i64) -> Result<Option<UserRow>> {
        let conn = self.conn()?;
        conn.query_row(
            &format!(
                "SELECT {} FROM users WHERE id = ?",
                select_list(None, USER_COLUMNS)
            ),
            params![id],
            |row| UserRow::read(row, 0),
        )
        .optional()
        .map_err(Into::into)
    }

    /// Get a user by external auth id
    pub fn get_user_by_auth_uid(&self, auth_uid: &str) -> Result<Option<UserRow>> {
        let conn = self.conn()?;
        conn.query_row(
            &format!(
                "SELECT {} FROM users WHERE auth_uid = ?",
                select_list(None, USER_COLUMNS)
            ),
            params![auth_uid],
            |row| UserRow::read(row, 0),
        )
        .optional()
        .map_err(Into::into)
    }

    /// List all users
    pub fn list_users(&self) -> Result<Vec<UserRow>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM users ORDER BY id",
            select_list(None, USER_COLUMNS)
        ))?;

        let users = stmt
            .query_map([], |row| UserRow::read(row, 0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(users)
    }

    /// Delete a user and everything they own
    pub fn delete_user(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM users WHERE id = ?", params![id])?;
        self.notify(Table::Users.cascade());
        Ok(())
    }
}
