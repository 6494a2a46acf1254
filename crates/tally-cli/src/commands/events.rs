//! Event command implementations

use anyhow::Result;
use tally_core::models::{timestamp_now, NewEvent};
use tally_core::Tally;

use super::{current_account, parse_end, parse_start, print_json};

pub async fn cmd_events_list(app: &Tally, json: bool) -> Result<()> {
    let account_id = current_account(app)?;
    let events = app
        .events
        .get_events(account_id)
        .next()
        .await
        .unwrap_or_else(|| Ok(Vec::new()))?;

    if json {
        return print_json(&events);
    }
    if events.is_empty() {
        println!("No events yet.");
        return Ok(());
    }

    println!();
    println!("📅 Events");
    for event in &events {
        let end = event
            .end_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "…".to_string());
        println!(
            "   [{}] {} ({} → {}), {} people",
            event.id,
            event.name,
            event.start_date.format("%Y-%m-%d"),
            end,
            event.participant_count
        );
        if !event.participants.is_empty() {
            println!("       {}", event.participants.join(", "));
        }
    }
    Ok(())
}

pub async fn cmd_events_add(
    app: &Tally,
    name: &str,
    start: Option<&str>,
    end: Option<&str>,
    participants: Vec<String>,
) -> Result<()> {
    let account_id = current_account(app)?;
    let start_date = match start {
        Some(date) => parse_start(date)?,
        None => timestamp_now(),
    };
    let end_date = end.map(parse_end).transpose()?;

    let id = app
        .events
        .add_event(NewEvent {
            name: name.to_string(),
            start_date,
            end_date,
            participant_count: None,
            account_id,
            participants,
        })
        .await?;

    println!("✅ Created event '{}' (id {})", name.trim(), id);
    Ok(())
}
