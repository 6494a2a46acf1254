use super::{required, Repositories};
use crate::db::Snapshots;
use crate::error::{ensure, Result};
use crate::models::{Event, EventWithParticipants, NewEvent};

fn clean_participants(names: &[String]) -> Vec<String> {
    names
        .iter()
        .map(|n| n.trim())
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Clone)]
pub struct EventUseCases {
    repos: Repositories,
}

impl EventUseCases {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Create an event; the participant count defaults to the number of names
    pub async fn add_event(&self, event: NewEvent) -> Result<i64> {
        let name = required(&event.name, "Event name")?;
        if let Some(end) = event.end_date {
            ensure(end >= event.start_date, "Event cannot end before it starts")?;
        }
        let participants = clean_participants(&event.participants);
        let participant_count = event
            .participant_count
            .unwrap_or(participants.len() as i32);
        ensure(participant_count >= 0, "Participant count cannot be negative")?;

        self.repos
            .events
            .insert(&Event {
                id: 0,
                name,
                start_date: event.start_date,
                end_date: event.end_date,
                participant_count,
                account_id: event.account_id,
                is_active: true,
                participants,
            })
            .await
    }

    pub async fn update_event(&self, event: &Event) -> Result<()> {
        let name = required(&event.name, "Event name")?;
        if let Some(end) = event.end_date {
            ensure(end >= event.start_date, "Event cannot end before it starts")?;
        }
        ensure(
            event.participant_count >= 0,
            "Participant count cannot be negative",
        )?;

        self.repos
            .events
            .update(&Event {
                name,
                participants: clean_participants(&event.participants),
                ..event.clone()
            })
            .await
    }

    pub async fn delete_event(&self, id: i64) -> Result<()> {
        self.repos.events.delete(id).await
    }

    pub async fn get_event(&self, id: i64) -> Result<Option<Event>> {
        self.repos.events.get(id).await
    }

    /// An account's events, latest start first, kept up to date
    pub fn get_events(&self, account_id: i64) -> Snapshots<Vec<Event>> {
        self.repos.events.watch_by_account(account_id)
    }

    pub fn search_events(&self, account_id: i64, query: &str) -> Snapshots<Vec<Event>> {
        self.repos.events.watch_search(account_id, query.trim())
    }

    pub fn get_event_with_participants(&self, id: i64) -> Snapshots<Option<EventWithParticipants>> {
        self.repos.events.watch_with_participants(id)
    }
}
