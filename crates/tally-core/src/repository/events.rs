use super::like_pattern;
use crate::db::rows::EventWithParticipantsRow;
use crate::db::{Database, Snapshots, Table};
use crate::error::Result;
use crate::models::{Event, EventWithParticipants};

const EVENT_TABLES: &[Table] = &[Table::Events, Table::EventParticipants];

#[derive(Clone)]
pub struct EventRepository {
    db: Database,
}

impl EventRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert or replace with participants, returning the id
    pub async fn insert(&self, event: &Event) -> Result<i64> {
        let row = EventWithParticipantsRow::from(event);
        self.db.call(move |db| db.upsert_event(&row)).await
    }

    pub async fn update(&self, event: &Event) -> Result<()> {
        let row = EventWithParticipantsRow::from(event);
        self.db.call(move |db| db.update_event(&row)).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.db.call(move |db| db.delete_event(id)).await
    }

    pub async fn get(&self, id: i64) -> Result<Option<Event>> {
        self.db
            .call(move |db| Ok(db.get_event_with_participants(id)?.map(Event::from)))
            .await
    }

    pub async fn list_by_account(&self, account_id: i64) -> Result<Vec<Event>> {
        self.db
            .call(move |db| events_of(db, account_id))
            .await
    }

    /// Live list of an account's events, latest start first
    pub fn watch_by_account(&self, account_id: i64) -> Snapshots<Vec<Event>> {
        self.db
            .watch(EVENT_TABLES, move |db| events_of(db, account_id))
    }

    /// Live substring search over an account's event names
    pub fn watch_search(&self, account_id: i64, query: &str) -> Snapshots<Vec<Event>> {
        let pattern = like_pattern(query);
        self.db.watch(EVENT_TABLES, move |db| {
            Ok(db
                .search_events_by_account(account_id, &pattern)?
                .into_iter()
                .map(Event::from)
                .collect())
        })
    }

    /// Live view of one event and its participant rows
    pub fn watch_with_participants(&self, id: i64) -> Snapshots<Option<EventWithParticipants>> {
        self.db.watch(EVENT_TABLES, move |db| {
            Ok(db
                .get_event_with_participants(id)?
                .map(EventWithParticipants::from))
        })
    }
}

fn events_of(db: &Database, account_id: i64) -> Result<Vec<Event>> {
    Ok(db
        .list_events_by_account(account_id)?
        .into_iter()
        .map(Event::from)
        .collect())
}
