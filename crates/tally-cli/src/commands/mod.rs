//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Init and session commands
//! - `accounts` - Account commands (list, add, delete, select)
//! - `categories` - Category listing and search
//! - `transactions` - Transaction commands (list, add, delete)
//! - `payees` - Payee commands (list, add, search)
//! - `locations` - Location commands
//! - `events` - Event commands
//! - `images` - Image attachment commands
//! - `reports` - Home report and monthly expenses

pub mod accounts;
pub mod categories;
pub mod core;
pub mod events;
pub mod images;
pub mod locations;
pub mod payees;
pub mod reports;
pub mod transactions;

// Re-export command functions for main.rs
pub use accounts::*;
pub use categories::*;
pub use core::*;
pub use events::*;
pub use images::*;
pub use locations::*;
pub use payees::*;
pub use reports::*;
pub use transactions::*;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use tally_core::{Config, StaticContacts, Tally};

/// Load config (explicit file, default file, env) and open the store
pub fn open_app(data_dir: Option<&Path>, config: Option<&Path>) -> Result<Tally> {
    let mut config = Config::load(config).context("Failed to load config")?;
    if let Some(dir) = data_dir {
        config = config.rebase(dir.to_path_buf());
    }
    Tally::open(&config, Arc::new(StaticContacts::default()))
        .with_context(|| format!("Failed to open data dir {}", config.data_dir.display()))
}

/// The selected account, or a hint on how to select one
pub fn current_account(app: &Tally) -> Result<i64> {
    app.sessions
        .require_account_id()
        .context("No account selected. Run `tally init` or `tally accounts select <id>`")
}

/// Midnight UTC at the start of a `YYYY-MM-DD` date
pub fn parse_start(date: &str) -> Result<DateTime<Utc>> {
    Ok(parse_date(date)?.and_time(NaiveTime::MIN).and_utc())
}

/// Last millisecond of a `YYYY-MM-DD` date, UTC
pub fn parse_end(date: &str) -> Result<DateTime<Utc>> {
    let next = parse_date(date)? + Duration::days(1);
    Ok(next.and_time(NaiveTime::MIN).and_utc() - Duration::milliseconds(1))
}

fn parse_date(date: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", date))
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
