//! Event operations, including the participant child rows

use std::collections::HashMap;

use rusqlite::{params, params_from_iter, OptionalExtension};

use super::rows::{
    select_list, EventParticipantRow, EventRow, EventWithParticipantsRow, EVENT_COLUMNS,
};
use super::{in_transaction, new_id, Database, DbConn, Table};
use crate::error::Result;

/// Ids per `IN (...)` batch, well under SQLite's bound-parameter limit
pub(super) const ID_BATCH: usize = 500;

/// Load participants for many events at once, keyed by event id, in position order
pub(super) fn load_participants(
    conn: &DbConn,
    event_ids: &[i64],
) -> Result<HashMap<i64, Vec<EventParticipantRow>>> {
    let mut by_event: HashMap<i64, Vec<EventParticipantRow>> = HashMap::new();

    for chunk in event_ids.chunks(ID_BATCH) {
        let placeholders = vec!["?"; chunk.len()].join(", ");
        let mut stmt = conn.prepare(&format!(
            "SELECT id, event_id, position, name FROM event_participants
             WHERE event_id IN ({}) ORDER BY event_id, position, id",
            placeholders
        ))?;

        let rows = stmt
            .query_map(params_from_iter(chunk.iter()), |row| {
                Ok(EventParticipantRow {
                    id: row.get(0)?,
                    event_id: row.get(1)?,
                    position: row.get(2)?,
                    name: row.get(3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        for participant in rows {
            by_event
                .entry(participant.event_id)
                .or_default()
                .push(participant);
        }
    }

    Ok(by_event)
}

fn replace_participants(conn: &DbConn, event_id: i64, names: &[String]) -> Result<()> {
    conn.execute(
        "DELETE FROM event_participants WHERE event_id = ?",
        params![event_id],
    )?;

    let mut stmt = conn
        .prepare("INSERT INTO event_participants (event_id, position, name) VALUES (?, ?, ?)")?;
    for (position, name) in names.iter().enumerate() {
        stmt.execute(params![event_id, position as i32, name])?;
    }
    Ok(())
}

fn participant_names(participants: &[EventParticipantRow]) -> Vec<String> {
    participants.iter().map(|p| p.name.clone()).collect()
}

impl Database {
    /// Insert or replace an event and its participants, returning the id
    ///
    /// Participant rows are replaced wholesale, in the order given.
    pub fn upsert_event(&self, event: &EventWithParticipantsRow) -> Result<i64> {
        let conn = self.conn()?;
        let row = &event.event;

        let id = in_transaction(&conn, |conn| {
            let id: i64 = conn.query_row(
                r#"
                INSERT INTO events (id, name, start_date, end_date, participant_count, account_id, is_active)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    start_date = excluded.start_date,
                    end_date = excluded.end_date,
                    participant_count = excluded.participant_count,
                    account_id = excluded.account_id,
                    is_active = excluded.is_active
                RETURNING id
                "#,
                params![
                    new_id(row.id),
                    row.name,
                    row.start_date,
                    row.end_date,
                    row.participant_count,
                    row.account_id,
                    row.is_active
                ],
                |r| r.get(0),
            )?;

            replace_participants(conn, id, &participant_names(&event.participants))?;
            Ok(id)
        })?;

        self.notify(&[Table::Events, Table::EventParticipants]);
        Ok(id)
    }

    /// Update an event by id, replacing its participants
    pub fn update_event(&self, event: &EventWithParticipantsRow) -> Result<()> {
        let conn = self.conn()?;
        let row = &event.event;

        in_transaction(&conn, |conn| {
            conn.execute(
                r#"
                UPDATE events
                SET name = ?, start_date = ?, end_date = ?, participant_count = ?,
                    account_id = ?, is_active = ?
                WHERE id = ?
                "#,
                params![
                    row.name,
                    row.start_date,
                    row.end_date,
                    row.participant_count,
                    row.account_id,
                    row.is_active,
                    row.id
                ],
            )?;
            replace_participants(conn, row.id, &participant_names(&event.participants))
        })?;

        self.notify(&[Table::Events, Table::EventParticipants]);
        Ok(())
    }

    /// Delete an event; its transactions keep existing without it
    pub fn delete_event(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM events WHERE id = ?", params![id])?;
        self.notify(Table::Events.cascade());
        Ok(())
    }

    /// Get an event row by ID
    pub fn get_event(&self, id: i64) -> Result<Option<EventRow>> {
        let conn = self.conn()?;
        conn.query_row(
            &format!(
                "SELECT {} FROM events WHERE id = ?",
                select_list(None, EVENT_COLUMNS)
            ),
            params![id],
            |row| EventRow::read(row, 0),
        )
        .optional()
        .map_err(Into::into)
    }

    /// Get an event together with its participants
    pub fn get_event_with_participants(&self, id: i64) -> Result<Option<EventWithParticipantsRow>> {
        let Some(event) = self.get_event(id)? else {
            return Ok(None);
        };

        let conn = self.conn()?;
        let participants = load_participants(&conn, &[id])?
            .remove(&id)
            .unwrap_or_default();

        Ok(Some(EventWithParticipantsRow {
            event,
            participants,
        }))
    }

    /// List an account's events with participants, latest start first
    pub fn list_events_by_account(&self, account_id: i64) -> Result<Vec<EventWithParticipantsRow>> {
        self.query_events("account_id = ?", params![account_id])
    }

    /// An account's events whose name matches a LIKE pattern, latest start first
    pub fn search_events_by_account(
        &self,
        account_id: i64,
        pattern: &str,
    ) -> Result<Vec<EventWithParticipantsRow>> {
        self.query_events(
            "account_id = ? AND name LIKE ? ESCAPE '\\'",
            params![account_id, pattern],
        )
    }

    fn query_events(
        &self,
        filter: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<EventWithParticipantsRow>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM events WHERE {} ORDER BY start_date DESC, id DESC",
            select_list(None, EVENT_COLUMNS),
            filter
        ))?;

        let events = stmt
            .query_map(params, |row| EventRow::read(row, 0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let ids: Vec<i64> = events.iter().map(|e| e.id).collect();
        let mut participants = load_participants(&conn, &ids)?;

        Ok(events
            .into_iter()
            .map(|event| EventWithParticipantsRow {
                participants: participants.remove(&event.id).unwrap_or_default(),
                event,
            })
            .collect())
    }

    /// Participants of one event in position order
    pub fn list_event_participants(&self, event_id: i64) -> Result<Vec<EventParticipantRow>> {
        let conn = self.conn()?;
        Ok(load_participants(&conn, &[event_id])?
            .remove(&event_id)
            .unwrap_or_default())
    }
}
