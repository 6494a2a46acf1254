//! Location operations

use rusqlite::{params, OptionalExtension};

use super::rows::{select_list, LocationRow, LOCATION_COLUMNS};
use super::{new_id, Database, Table};
use crate::error::Result;

impl Database {
    /// Insert or replace a location by id, returning the id
    pub fn upsert_location(&self, location: &LocationRow) -> Result<i64> {
        let conn = self.conn()?;
        let id: i64 = conn.query_row(
            r#"
            INSERT INTO locations (id, name, account_id, latitude, longitude)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                account_id = excluded.account_id,
                latitude = excluded.latitude,
                longitude = excluded.longitude
            RETURNING id
            "#,
            params![
                new_id(location.id),
                location.name,
                location.account_id,
                location.latitude,
                location.longitude
            ],
            |row| row.get(0),
        )?;

        self.notify(&[Table::Locations]);
        Ok(id)
    }

    pub fn update_location(&self, location: &LocationRow) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "UPDATE locations SET name = ?, account_id = ?, latitude = ?, longitude = ? WHERE id = ?",
            params![
                location.name,
                location.account_id,
                location.latitude,
                location.longitude,
                location.id
            ],
        )?;
        self.notify(&[Table::Locations]);
        Ok(())
    }

    /// Delete a location; referencing transactions keep existing
    pub fn delete_location(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM locations WHERE id = ?", params![id])?;
        self.notify(Table::Locations.cascade());
        Ok(())
    }

    /// Get a location by ID
    pub fn get_location(&self, id: i64) -> Result<Option<LocationRow>> {
        let conn = self.conn()?;
        conn.query_row(
            &format!(
                "SELECT {} FROM locations WHERE id = ?",
                select_list(None, LOCATION_COLUMNS)
            ),
            params![id],
            |row| LocationRow::read(row, 0),
        )
        .optional()
        .map_err(Into::into)
    }

    /// Exact, case-sensitive name lookup within an account
    pub fn get_location_by_name(&self, account_id: i64, name: &str) -> Result<Option<LocationRow>> {
        let conn = self.conn()?;
        conn.query_row(
            &format!(
                "SELECT {} FROM locations WHERE name = ? COLLATE BINARY AND account_id = ? ORDER BY id LIMIT 1",
                select_list(None, LOCATION_COLUMNS)
            ),
            params![name, account_id],
            |row| LocationRow::read(row, 0),
        )
        .optional()
        .map_err(Into::into)
    }

    /// List an account's locations by name
    pub fn list_locations(&self, account_id: i64) -> Result<Vec<LocationRow>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM locations WHERE account_id = ? ORDER BY name ASC, id",
            select_list(None, LOCATION_COLUMNS)
        ))?;

        let locations = stmt
            .query_map(params![account_id], |row| LocationRow::read(row, 0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(locations)
    }

    /// Locations whose name matches a LIKE pattern
    pub fn search_locations(&self, account_id: i64, pattern: &str) -> Result<Vec<LocationRow>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM locations WHERE account_id = ? AND name LIKE ? ESCAPE '\\' ORDER BY name ASC, id",
            select_list(None, LOCATION_COLUMNS)
        ))?;

        let locations = stmt
            .query_map(params![account_id, pattern], |row| LocationRow::read(row, 0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(locations)
    }
}
