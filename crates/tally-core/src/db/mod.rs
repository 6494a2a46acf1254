//! Database access layer with connection pooling and schema management
//!
//! This module is organized by table group:
//! - `rows` - Persisted row shapes and column lists
//! - `users` - User operations
//! - `accounts` - Account operations and balances
//! - `categories` - Category tree, seeding, usage counts
//! - `transactions` - Transactions, payee joins, detail joins
//! - `events` - Events and their participants
//! - `payees` - Payees, payee-transaction entries, lenders, borrowers
//! - `locations` - Locations
//! - `images` - Transaction image rows
//! - `watch` - Change notification and snapshot subscriptions
//!
//! Everything here is synchronous. Repositories run these calls through
//! [`Database::call`] and [`Database::watch`].

use std::path::Path;
use std::sync::Arc;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::error::Result;

mod accounts;
mod categories;
mod events;
mod images;
mod locations;
mod payees;
pub mod rows;
mod transactions;
mod users;
mod watch;

pub use categories::{SeedCategory, SEED_CATEGORIES};
pub use payees::CounterpartyTable;
pub use watch::{Snapshots, Table};

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Schema version stored in `PRAGMA user_version`
///
/// A database carrying any other non-zero version is wiped and recreated.
pub const SCHEMA_VERSION: i32 = 5;

/// Default number of pooled connections
pub const DEFAULT_POOL_SIZE: u32 = 10;

/// Capacity of the change broadcast; lagging watchers just recompute
const CHANGE_CAPACITY: usize = 256;

/// Tables in drop order (children first)
const ALL_TABLES: &[&str] = &[
    "transaction_images",
    "transaction_payees",
    "transactions",
    "event_participants",
    "events",
    "locations",
    "payee_transactions",
    "payees",
    "lenders",
    "borrowers",
    "categories",
    "accounts",
    "users",
];

/// Convert an id of 0 ("not yet saved") to NULL so SQLite generates one
pub(crate) fn new_id(id: i64) -> Option<i64> {
    (id != 0).then_some(id)
}

/// Run `f` inside BEGIN/COMMIT, rolling back if it fails
pub(crate) fn in_transaction<T>(conn: &DbConn, f: impl FnOnce(&DbConn) -> Result<T>) -> Result<T> {
    conn.execute("BEGIN TRANSACTION", [])?;

    match f(conn) {
        Ok(value) => {
            conn.execute("COMMIT", [])?;
            Ok(value)
        }
        Err(e) => {
            let _ = conn.execute("ROLLBACK", []);
            Err(e)
        }
    }
}

/// Database wrapper with connection pooling and change notification
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    /// Path to the database file
    db_path: String,
    changes: broadcast::Sender<Vec<Table>>,
    /// Directory owning a throw-away database; removed with the last clone
    scratch: Option<Arc<tempfile::TempDir>>,
}

impl Database {
    /// Open (or create) the database file at `path`
    pub fn new(path: &str) -> Result<Self> {
        Self::with_pool_size(path, DEFAULT_POOL_SIZE)
    }

    /// Open the database with an explicit pool size
    pub fn with_pool_size(path: &str, pool_size: u32) -> Result<Self> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        // Foreign keys are per-connection in SQLite, so every pooled
        // connection has to switch them on.
        let manager = SqliteConnectionManager::file(path).with_init(|conn| {
            conn.execute_batch("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")
        });

        let pool = Pool::builder().max_size(pool_size.max(1)).build(manager)?;
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);

        let db = Self {
            pool,
            db_path: path.to_string(),
            changes,
            scratch: None,
        };
        db.run_migrations()?;

        Ok(db)
    }

    /// Create a throw-away database (for testing)
    ///
    /// Note: Uses a temporary file rather than `:memory:` because every
    /// pooled connection would otherwise see its own empty database.
    pub fn in_memory() -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("tally_test_").tempdir()?;
        let path = dir.path().join("tally.db");

        let mut db = Self::with_pool_size(&path.to_string_lossy(), 4)?;
        db.scratch = Some(Arc::new(dir));
        Ok(db)
    }

    /// Get the path to the database file
    pub fn path(&self) -> &str {
        &self.db_path
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    /// Read the schema version currently stored in the file
    pub fn schema_version(&self) -> Result<i32> {
        let conn = self.conn()?;
        let version: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
        Ok(version)
    }

    /// Publish that `tables` changed
    pub(crate) fn notify(&self, tables: &[Table]) {
        // No receivers just means nobody is watching
        let _ = self.changes.send(tables.to_vec());
    }

    pub(crate) fn subscribe_changes(&self) -> broadcast::Receiver<Vec<Table>> {
        self.changes.subscribe()
    }

    /// Number of live watchers listening for changes
    pub fn active_watchers(&self) -> usize {
        self.changes.receiver_count()
    }

    /// Create tables, recreating them from scratch when the stored version differs
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        let stored: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
        if stored != 0 && stored != SCHEMA_VERSION {
            warn!(
                stored,
                expected = SCHEMA_VERSION,
                "Schema version mismatch, recreating all tables"
            );
            let mut drop_sql = String::from("PRAGMA foreign_keys = OFF;\n");
            for table in ALL_TABLES {
                drop_sql.push_str(&format!("DROP TABLE IF EXISTS {};\n", table));
            }
            drop_sql.push_str("PRAGMA foreign_keys = ON;\n");
            conn.execute_batch(&drop_sql)?;
        }

        conn.execute_batch(
            r#"
            -- WAL mode: readers don't block the writer
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;

            -- Users (one user owns many accounts)
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT,
                auth_uid TEXT,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_users_auth_uid ON users(auth_uid);

            -- Accounts (wallets/ledgers)
            CREATE TABLE IF NOT EXISTS accounts (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                username TEXT NOT NULL,
                account_type TEXT NOT NULL DEFAULT 'cash',
                balance REAL NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_accounts_user ON accounts(user_id);
            CREATE INDEX IF NOT EXISTS idx_accounts_username ON accounts(username);

            -- Categories (self-referencing tree)
            CREATE TABLE IF NOT EXISTS categories (
                id INTEGER PRIMARY KEY,
                parent_id INTEGER REFERENCES categories(id) ON DELETE CASCADE,
                title TEXT NOT NULL,
                icon TEXT NOT NULL,
                category_type TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_categories_parent ON categories(parent_id);
            CREATE INDEX IF NOT EXISTS idx_categories_type ON categories(category_type);

            -- Events/trips
            CREATE TABLE IF NOT EXISTS events (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                start_date INTEGER NOT NULL,
                end_date INTEGER,
                participant_count INTEGER NOT NULL DEFAULT 0,
                account_id INTEGER NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
                is_active BOOLEAN NOT NULL DEFAULT 1
            );

            CREATE INDEX IF NOT EXISTS idx_events_account ON events(account_id);

            -- One row per event participant, ordered by position
            CREATE TABLE IF NOT EXISTS event_participants (
                id INTEGER PRIMARY KEY,
                event_id INTEGER NOT NULL REFERENCES events(id) ON DELETE CASCADE,
                position INTEGER NOT NULL,
                name TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_event_participants_event ON event_participants(event_id);

            -- Locations
            CREATE TABLE IF NOT EXISTS locations (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                account_id INTEGER NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
                latitude REAL,
                longitude REAL
            );

            CREATE INDEX IF NOT EXISTS idx_locations_account ON locations(account_id);

            -- Payees (payee/lender/borrower roles)
            CREATE TABLE IF NOT EXISTS payees (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                account_id INTEGER NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
                payee_type TEXT NOT NULL DEFAULT 'payee',
                is_from_contacts BOOLEAN NOT NULL DEFAULT 0,
                contact_id INTEGER,
                phone_number TEXT,
                email TEXT,
                notes TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_payees_account_type ON payees(account_id, payee_type);

            -- Per-account payee list entries
            CREATE TABLE IF NOT EXISTS payee_transactions (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                account_id INTEGER NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
                is_from_contacts BOOLEAN NOT NULL DEFAULT 0,
                contact_id INTEGER
            );

            CREATE INDEX IF NOT EXISTS idx_payee_transactions_account ON payee_transactions(account_id);

            -- Lenders and borrowers
            CREATE TABLE IF NOT EXISTS lenders (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                phone_number TEXT,
                email TEXT,
                account_id INTEGER NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
                notes TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_lenders_account ON lenders(account_id);

            CREATE TABLE IF NOT EXISTS borrowers (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                phone_number TEXT,
                email TEXT,
                account_id INTEGER NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
                notes TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_borrowers_account ON borrowers(account_id);

            -- Transactions
            CREATE TABLE IF NOT EXISTS transactions (
                id INTEGER PRIMARY KEY,
                amount REAL NOT NULL,
                created_at INTEGER NOT NULL,
                description TEXT NOT NULL,
                category_id INTEGER NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
                account_id INTEGER NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
                event_id INTEGER REFERENCES events(id) ON DELETE SET NULL,
                location_id INTEGER REFERENCES locations(id) ON DELETE SET NULL,
                lender_id INTEGER REFERENCES lenders(id) ON DELETE SET NULL,
                borrower_id INTEGER REFERENCES borrowers(id) ON DELETE SET NULL
            );

            CREATE INDEX IF NOT EXISTS idx_transactions_account_date ON transactions(account_id, created_at);
            CREATE INDEX IF NOT EXISTS idx_transactions_category ON transactions(category_id);
            CREATE INDEX IF NOT EXISTS idx_transactions_event ON transactions(event_id);

            -- Transaction-Payee junction (many-to-many)
            CREATE TABLE IF NOT EXISTS transaction_payees (
                id INTEGER PRIMARY KEY,
                transaction_id INTEGER NOT NULL REFERENCES transactions(id) ON DELETE CASCADE,
                payee_id INTEGER NOT NULL REFERENCES payees(id) ON DELETE CASCADE,
                UNIQUE(transaction_id, payee_id)
            );

            CREATE INDEX IF NOT EXISTS idx_transaction_payees_payee ON transaction_payees(payee_id);

            -- Transaction images (files live under the images directory)
            CREATE TABLE IF NOT EXISTS transaction_images (
                id INTEGER PRIMARY KEY,
                transaction_id INTEGER NOT NULL REFERENCES transactions(id) ON DELETE CASCADE,
                file_path TEXT NOT NULL,
                file_name TEXT NOT NULL,
                mime_type TEXT NOT NULL DEFAULT 'image/jpeg',
                file_size INTEGER NOT NULL,
                created_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_transaction_images_transaction ON transaction_images(transaction_id);
            "#,
        )?;

        conn.execute_batch(&format!("PRAGMA user_version = {};", SCHEMA_VERSION))?;

        info!(version = SCHEMA_VERSION, "Database schema initialized");
        Ok(())
    }
}

#[cfg(test)]
mod tests;
