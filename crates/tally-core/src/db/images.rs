//! Transaction image rows (the files themselves live in `crate::storage`)

use rusqlite::params;

use super::rows::{select_list, TransactionImageRow, IMAGE_COLUMNS};
use super::{in_transaction, new_id, Database, DbConn, Table};
use crate::error::Result;

fn insert_image_row(conn: &DbConn, image: &TransactionImageRow) -> Result<i64> {
    let id: i64 = conn.query_row(
        r#"
        INSERT INTO transaction_images (id, transaction_id, file_path, file_name,
                                        mime_type, file_size, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            transaction_id = excluded.transaction_id,
            file_path = excluded.file_path,
            file_name = excluded.file_name,
            mime_type = excluded.mime_type,
            file_size = excluded.file_size,
            created_at = excluded.created_at
        RETURNING id
        "#,
        params![
            new_id(image.id),
            image.transaction_id,
            image.file_path,
            image.file_name,
            image.mime_type,
            image.file_size,
            image.created_at
        ],
        |row| row.get(0),
    )?;
    Ok(id)
}

impl Database {
    /// Insert or replace one image row, returning the id
    pub fn insert_image(&self, image: &TransactionImageRow) -> Result<i64> {
        let conn = self.conn()?;
        let id = insert_image_row(&conn, image)?;
        self.notify(&[Table::TransactionImages]);
        Ok(id)
    }

    /// Insert many image rows in one SQL transaction, returning ids in order
    pub fn insert_images(&self, images: &[TransactionImageRow]) -> Result<Vec<i64>> {
        if images.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.conn()?;
        let ids = in_transaction(&conn, |conn| {
            images
                .iter()
                .map(|image| insert_image_row(conn, image))
                .collect::<Result<Vec<_>>>()
        })?;

        self.notify(&[Table::TransactionImages]);
        Ok(ids)
    }

    /// Images attached to a transaction, oldest first
    pub fn list_images(&self, transaction_id: i64) -> Result<Vec<TransactionImageRow>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM transaction_images WHERE transaction_id = ? ORDER BY created_at, id",
            select_list(None, IMAGE_COLUMNS)
        ))?;

        let images = stmt
            .query_map(params![transaction_id], |row| TransactionImageRow::read(row, 0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(images)
    }

    pub fn delete_image(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM transaction_images WHERE id = ?", params![id])?;
        self.notify(&[Table::TransactionImages]);
        Ok(())
    }

    /// Delete every image row of a transaction, returning how many went
    pub fn delete_images_for_transaction(&self, transaction_id: i64) -> Result<usize> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM transaction_images WHERE transaction_id = ?",
            params![transaction_id],
        )?;
        self.notify(&[Table::TransactionImages]);
        Ok(deleted)
    }
}
