//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tally - Track where your money goes
#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Personal expense ledger", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Data directory (database, images, session)
    ///
    /// Overrides the config file and TALLY_DATA_DIR.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Config file (defaults to <data_local_dir>/tally/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the store, the admin account and the default categories
    Init,

    /// Manage accounts
    Accounts {
        #[command(subcommand)]
        action: Option<AccountsAction>,
    },

    /// List categories
    Categories {
        /// Only categories of this type (expense, income, lend, borrowing, ...)
        #[arg(short, long)]
        r#type: Option<String>,

        /// Case-insensitive title search (requires --type)
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Manage transactions of the current account
    Transactions {
        #[command(subcommand)]
        action: Option<TransactionsAction>,
    },

    /// Manage payees of the current account
    Payees {
        #[command(subcommand)]
        action: Option<PayeesAction>,
    },

    /// Manage locations of the current account
    Locations {
        #[command(subcommand)]
        action: Option<LocationsAction>,
    },

    /// Manage events of the current account
    Events {
        #[command(subcommand)]
        action: Option<EventsAction>,
    },

    /// Manage transaction images
    Images {
        #[command(subcommand)]
        action: ImagesAction,
    },

    /// Income, expense and top categories for a date range
    Report {
        /// Start date (YYYY-MM-DD, defaults to the first of this month)
        #[arg(long)]
        from: Option<String>,

        /// End date, inclusive (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        to: Option<String>,

        /// Also show expenses per month
        #[arg(long)]
        monthly: bool,
    },

    /// Show or clear the current session
    Session {
        #[command(subcommand)]
        action: Option<SessionAction>,
    },
}

#[derive(Subcommand)]
pub enum AccountsAction {
    /// List the current user's accounts
    List,

    /// Add an account
    Add {
        /// Account name
        name: String,

        /// Account type: cash, bank, credit, e_wallet, other
        #[arg(short, long, default_value = "cash")]
        r#type: String,

        /// Opening balance
        #[arg(short, long, default_value = "0")]
        balance: f64,
    },

    /// Delete an account and everything recorded in it
    Delete {
        /// Account ID
        id: i64,
    },

    /// Make an account the current one
    Select {
        /// Account ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum TransactionsAction {
    /// List transactions, newest first
    List {
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// End date, inclusive (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Maximum number to show
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,
    },

    /// Record a transaction
    Add {
        /// Amount (always positive; the category decides the direction)
        amount: f64,

        /// What it was for
        description: String,

        /// Category ID (see `tally categories`)
        #[arg(short, long)]
        category: i64,

        /// Date (YYYY-MM-DD, defaults to now)
        #[arg(short, long)]
        date: Option<String>,

        /// Payee IDs to link
        #[arg(short, long, value_delimiter = ',')]
        payees: Vec<i64>,

        /// Location ID
        #[arg(long)]
        location: Option<i64>,

        /// Event ID
        #[arg(long)]
        event: Option<i64>,

        /// Lender ID
        #[arg(long)]
        lender: Option<i64>,

        /// Borrower ID
        #[arg(long)]
        borrower: Option<i64>,
    },

    /// Delete a transaction and undo its balance change
    Delete {
        /// Transaction ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum PayeesAction {
    /// List payees
    List {
        /// Payee type: payee, lender, borrower
        #[arg(short, long, default_value = "payee")]
        r#type: String,
    },

    /// Add a payee (returns the existing one if the name is taken)
    Add {
        /// Payee name
        name: String,

        /// Payee type: payee, lender, borrower
        #[arg(short, long, default_value = "payee")]
        r#type: String,

        /// Phone number
        #[arg(long)]
        phone: Option<String>,
    },

    /// Search payees by name
    Search {
        /// Text contained in the name
        query: String,

        /// Payee type: payee, lender, borrower
        #[arg(short, long, default_value = "payee")]
        r#type: String,
    },
}

#[derive(Subcommand)]
pub enum LocationsAction {
    /// List locations
    List,

    /// Add a location (returns the existing one if the name is taken)
    Add {
        /// Location name
        name: String,

        /// Latitude
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Longitude
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
    },
}

#[derive(Subcommand)]
pub enum EventsAction {
    /// List events, latest first
    List,

    /// Add an event
    Add {
        /// Event name
        name: String,

        /// Start date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,

        /// Participant names
        #[arg(short, long, value_delimiter = ',')]
        participants: Vec<String>,
    },
}

#[derive(Subcommand)]
pub enum ImagesAction {
    /// Copy image files into storage and attach them to a transaction
    Attach {
        /// Transaction ID
        transaction: i64,

        /// Image files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// List images of a transaction
    List {
        /// Transaction ID
        transaction: i64,
    },
}

#[derive(Subcommand)]
pub enum SessionAction {
    /// Show the current user and account
    Show,

    /// Forget the current user and account
    Clear,
}
