//! Tally Core Library
//!
//! Persistence and domain core for the Tally expense tracker:
//! - SQLite schema, pooled access and change notification
//! - Row/domain mapping
//! - Repositories with one-shot reads and live snapshot streams
//! - Durable session state (current user and account)
//! - File-backed transaction image storage
//! - Use cases, including home-screen reports

pub mod config;
pub mod contacts;
pub mod db;
pub mod error;
pub mod mapper;
pub mod models;
pub mod repository;
pub mod session;
pub mod storage;
pub mod usecases;

use std::sync::Arc;

use tracing::info;

pub use config::Config;
pub use contacts::{ContactSource, StaticContacts};
pub use db::{Database, Snapshots, Table};
pub use error::{Error, Result};
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionStore};
pub use storage::ImageStore;
pub use usecases::{
    AccountUseCases, CategoryUseCases, ContactUseCases, CounterpartyUseCases, EventUseCases,
    HomeReport, ImageUseCases, LocationUseCases, ReportUseCases, Repositories, SessionUseCases,
    TransactionUseCases,
};

/// Everything a front end needs, wired over one database and session
#[derive(Clone)]
pub struct Tally {
    pub db: Database,
    pub session: Arc<Session>,
    pub images: ImageStore,
    pub accounts: AccountUseCases,
    pub categories: CategoryUseCases,
    pub transactions: TransactionUseCases,
    pub events: EventUseCases,
    pub counterparties: CounterpartyUseCases,
    pub locations: LocationUseCases,
    pub attachments: ImageUseCases,
    pub contacts: ContactUseCases,
    pub reports: ReportUseCases,
    pub sessions: SessionUseCases,
}

impl Tally {
    /// Open the database, session file and image store named by `config`
    pub fn open(config: &Config, contacts: Arc<dyn ContactSource>) -> Result<Self> {
        let db_path = config.database_path();
        let db = Database::with_pool_size(&db_path.to_string_lossy(), config.pool_size)?;
        let session = Session::open(FileSessionStore::new(config.session_path()))?;
        info!(path = %db_path.display(), "Opened tally store");

        Ok(Self::assemble(db, session, ImageStore::from_config(config), contacts))
    }

    /// Wire use cases over already-open parts
    pub fn assemble(
        db: Database,
        session: Session,
        images: ImageStore,
        contacts: Arc<dyn ContactSource>,
    ) -> Self {
        let repos = Repositories::new(&db);
        let session = Arc::new(session);

        Self {
            accounts: AccountUseCases::new(repos.clone(), session.clone()),
            categories: CategoryUseCases::new(repos.clone()),
            transactions: TransactionUseCases::new(repos.clone(), images.clone()),
            events: EventUseCases::new(repos.clone()),
            counterparties: CounterpartyUseCases::new(repos.clone()),
            locations: LocationUseCases::new(repos.clone()),
            attachments: ImageUseCases::new(repos.clone(), images.clone()),
            contacts: ContactUseCases::new(contacts),
            reports: ReportUseCases::new(repos.clone()),
            sessions: SessionUseCases::new(repos, session.clone()),
            db,
            session,
            images,
        }
    }

    /// Seed the admin user/account and categories, then restore the session
    ///
    /// Safe to run on every start. Returns the selected account, if any.
    pub async fn bootstrap(&self) -> Result<Option<i64>> {
        self.accounts.initialize_admin().await?;
        self.categories.initialize_categories().await?;
        self.sessions.initialize_session().await
    }
}
